//! System font lookup for text rasterization.
//!
//! Faces are resolved through a process-wide `fontdb` database (system fonts,
//! loaded once) and parsed with `rusttype`. Lookups are cached per
//! `(family, bold)`, misses included, so a missing family is only searched for
//! once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use rusttype::Font;

#[derive(Clone, PartialEq, Eq, Hash)]
struct FontKey {
    family: String,
    bold: bool,
}

type FontCache = Mutex<HashMap<FontKey, Option<Arc<Font<'static>>>>>;

fn db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        db
    })
}

/// Resolve a font for a CSS family name and weight.
///
/// Falls back to the generic sans-serif family, and returns `None` only when
/// the system has no usable face at all.
pub fn font_for(family: &str, weight: u16) -> Option<Arc<Font<'static>>> {
    static CACHE: OnceLock<FontCache> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    let key = FontKey { family: family.trim().to_owned(), bold: weight >= 600 };
    if let Some(hit) = cache.lock().unwrap_or_else(PoisonError::into_inner).get(&key) {
        return hit.clone();
    }

    let loaded = load(&key.family, key.bold).or_else(|| load("", key.bold)).map(Arc::new);
    if loaded.is_none() {
        tracing::warn!(family = %key.family, "no usable font face; text will not be drawn");
    }
    cache.lock().unwrap_or_else(PoisonError::into_inner).insert(key, loaded.clone());
    loaded
}

fn load(family: &str, bold: bool) -> Option<Font<'static>> {
    let families: Vec<Family<'_>> = match family {
        "" | "sans-serif" => vec![Family::SansSerif],
        "serif" => vec![Family::Serif],
        "monospace" => vec![Family::Monospace],
        other => vec![Family::Name(other)],
    };
    let query = Query {
        families: &families,
        weight: if bold { Weight::BOLD } else { Weight::NORMAL },
        stretch: Stretch::Normal,
        style: Style::Normal,
    };

    let id = db().query(&query)?;
    db().with_face_data(id, |data, index| Font::try_from_vec_and_index(data.to_vec(), index)).flatten()
}
