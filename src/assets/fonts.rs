use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use usvg::fontdb;

/// A concrete font face chosen for a CSS family list and weight.
#[derive(Debug)]
pub(crate) struct ResolvedFace {
    /// Stable per-book key for this face.
    pub(crate) key: u32,
    pub(crate) family: String,
    pub(crate) weight: u16,
    pub(crate) data: Arc<Vec<u8>>,
    pub(crate) index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct QueryKey {
    families: Vec<String>,
    weight: u16,
}

/// Font lookup over a `fontdb` database, with per-query and per-face caching.
pub(crate) struct FontBook {
    db: fontdb::Database,
    queries: HashMap<QueryKey, Option<Arc<ResolvedFace>>>,
    faces: HashMap<fontdb::ID, Arc<ResolvedFace>>,
}

impl FontBook {
    pub(crate) fn new(font_dirs: &[PathBuf], load_system_fonts: bool) -> Self {
        let mut db = fontdb::Database::new();
        if load_system_fonts {
            db.load_system_fonts();
        }
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self {
            db,
            queries: HashMap::new(),
            faces: HashMap::new(),
        }
    }

    pub(crate) fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Resolve a CSS family list and weight to a face. Falls back to generic families and then to
    /// any face in the database; `None` only when the database is empty.
    pub(crate) fn resolve(&mut self, families: &[String], weight: u16) -> Option<Arc<ResolvedFace>> {
        let key = QueryKey {
            families: families.to_vec(),
            weight,
        };
        if let Some(hit) = self.queries.get(&key) {
            return hit.clone();
        }

        let resolved = self.query(families, weight).and_then(|id| self.face(id));
        if resolved.is_none() {
            tracing::warn!(?families, weight, "no font face resolvable");
        }
        self.queries.insert(key, resolved.clone());
        resolved
    }

    fn query(&self, families: &[String], weight: u16) -> Option<fontdb::ID> {
        let mut query_families: Vec<fontdb::Family<'_>> =
            families.iter().map(|f| css_family(f)).collect();
        query_families.push(fontdb::Family::SansSerif);
        query_families.push(fontdb::Family::Serif);

        let query = fontdb::Query {
            families: &query_families,
            weight: fontdb::Weight(weight),
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        self.db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))
    }

    fn face(&mut self, id: fontdb::ID) -> Option<Arc<ResolvedFace>> {
        if let Some(face) = self.faces.get(&id) {
            return Some(face.clone());
        }
        let info = self.db.face(id)?;
        let family = info
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_default();
        let weight = info.weight.0;
        let (data, index) = self.db.with_face_data(id, |data, index| (data.to_vec(), index))?;

        let face = Arc::new(ResolvedFace {
            key: self.faces.len() as u32,
            family,
            weight,
            data: Arc::new(data),
            index,
        });
        self.faces.insert(id, face.clone());
        Some(face)
    }
}

fn css_family(name: &str) -> fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => fontdb::Family::Serif,
        "sans-serif" | "system-ui" => fontdb::Family::SansSerif,
        "monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        _ => fontdb::Family::Name(name),
    }
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(err) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), %err, "failed to load font file");
        }
    }
}
