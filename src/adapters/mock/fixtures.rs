//! Sample payloads shaped like the listing endpoint's responses.

use serde_json::{json, Value};

use crate::models::UserRecord;

/// JSON for user number `n`. Every field that feeds `unique_id` or search
/// carries `n` so records are distinguishable. Even `n` get an integer
/// postcode, odd `n` a string one.
pub fn sample_user_json(n: usize) -> Value {
    let postcode = if n % 2 == 0 {
        json!(10000 + n)
    } else {
        json!(format!("EC{} 1BB", n))
    };
    json!({
        "gender": "female",
        "name": { "title": "Ms", "first": format!("Ada{}", n), "last": format!("Lovelace{}", n) },
        "location": {
            "street": { "number": n, "name": "Analytical Street" },
            "city": format!("London{}", n),
            "state": "Greater London",
            "country": "United Kingdom",
            "postcode": postcode,
            "coordinates": { "latitude": "51.5072", "longitude": "-0.1276" },
            "timezone": { "offset": "+0:00", "description": "Western Europe Time, London, Lisbon, Casablanca" }
        },
        "email": format!("ada{}@example.com", n),
        "login": {
            "uuid": format!("00000000-0000-4000-8000-{:012}", n),
            "username": format!("ada{}", n),
            "password": "engine",
            "salt": "s4lt",
            "md5": "d41d8cd98f00b204e9800998ecf8427e",
            "sha1": "da39a3ee5e6b4b0d3255bfef95601890afd80709",
            "sha256": "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        },
        "dob": { "date": "1990-01-05T09:30:00.000Z", "age": 30 + (n % 40) },
        "registered": { "date": "2015-06-01T12:00:00.000Z", "age": 9 },
        "phone": format!("020 7946 {:04}", n),
        "cell": format!("07700 900{:03}", n % 1000),
        "id": { "name": "NINO", "value": format!("QQ {:06} C", n) },
        "picture": {
            "large": format!("https://img.test/portraits/women/{}.jpg", n),
            "medium": format!("https://img.test/portraits/med/women/{}.jpg", n),
            "thumbnail": format!("https://img.test/portraits/thumb/women/{}.jpg", n)
        },
        "nat": "GB"
    })
}

/// Decoded user number `n`.
pub fn sample_user(n: usize) -> UserRecord {
    serde_json::from_value(sample_user_json(n)).expect("fixture user decodes")
}

/// Listing response for `page` holding `count` users out of `requested`.
/// Users are numbered so pages never overlap.
pub fn page_json(page: u32, count: usize, requested: u32, seed: &str) -> Value {
    let first = (page.saturating_sub(1) as usize) * requested as usize + 1;
    let results: Vec<Value> = (first..first + count).map(sample_user_json).collect();
    json!({
        "results": results,
        "info": { "seed": seed, "results": requested, "page": page, "version": "1.4" }
    })
}

/// A tiny valid PNG (`width` x `height`, opaque red).
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode fixture png");
    out.into_inner()
}
