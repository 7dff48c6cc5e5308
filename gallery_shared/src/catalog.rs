//! Artwork catalog.
//!
//! The catalog is a CSV table keyed by the `catalogF` id column. It
//! supplies titles, physical sizes in metres, a local image file name,
//! and a fallback remote image URL, used to enrich curation payloads
//! whose own fields are blank. A catalog miss is never fatal.
//!
//! The parser is self-contained (quoted fields, escaped quotes, CRLF):
//! the upstream data is a single small hand-maintained table and needs
//! nothing more.

use std::collections::HashMap;

use crate::exhibit::ExhibitItem;

/// Metres-to-scene-units scale for physical artwork sizes.
const METERS_TO_UNITS: f32 = 8.0;

/// Rendered frame size bounds, in scene units.
const FRAME_W_RANGE: (f32, f32) = (2.5, 10.0);
const FRAME_H_RANGE: (f32, f32) = (2.0, 8.0);

/// Default rendered frame size when no hint is available.
pub const DEFAULT_FRAME_W: f32 = 4.4;
pub const DEFAULT_FRAME_H: f32 = 3.2;

/// One catalog row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub year: String,
    pub width_m: Option<f32>,
    pub height_m: Option<f32>,
    pub image_file: String,
    pub remote_url: String,
}

/// In-memory catalog lookup.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses catalog CSV text. Requires a header row containing
    /// `catalogF`; all other columns are optional.
    pub fn from_csv(text: &str) -> anyhow::Result<Self> {
        let table = parse_csv(text);
        if table.len() < 2 {
            anyhow::bail!("catalog csv has no data rows");
        }

        let header: Vec<String> = table[0].iter().map(|h| h.trim().to_string()).collect();
        let col = |name: &str| header.iter().position(|h| h == name);

        let i_id = col("catalogF")
            .ok_or_else(|| anyhow::anyhow!("catalog csv missing column: catalogF"))?;
        let i_title = col("title");
        let i_year = col("year");
        let i_w = col("width");
        let i_h = col("height");
        let i_file = col("imagefilename");
        let i_url = col("wikimediaurl");

        let field = |row: &[String], i: Option<usize>| -> String {
            i.and_then(|i| row.get(i)).map(|s| s.trim().to_string()).unwrap_or_default()
        };
        let num = |row: &[String], i: Option<usize>| -> Option<f32> {
            i.and_then(|i| row.get(i)).and_then(|s| s.trim().parse::<f32>().ok())
        };

        let mut entries = HashMap::new();
        for row in &table[1..] {
            let id = row.get(i_id).map(|s| s.trim()).unwrap_or_default();
            if id.is_empty() {
                continue;
            }
            entries.insert(
                id.to_string(),
                CatalogEntry {
                    id: id.to_string(),
                    title: field(row, i_title),
                    year: field(row, i_year),
                    width_m: num(row, i_w),
                    height_m: num(row, i_h),
                    image_file: field(row, i_file),
                    remote_url: field(row, i_url),
                },
            );
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// Resolves the display image URL for an entry: a local image file
    /// wins, then the remote URL when it points at the Wikimedia upload
    /// host, otherwise nothing.
    pub fn resolve_image_url(&self, id: &str, assets_base: &str) -> Option<String> {
        let meta = self.entries.get(id)?;
        if !meta.image_file.is_empty() {
            return Some(format!("{}/{}", assets_base.trim_end_matches('/'), meta.image_file));
        }
        if meta.remote_url.contains("upload.wikimedia.org") {
            return Some(meta.remote_url.clone());
        }
        None
    }

    /// Enriches payload items with catalog data: blank titles fall back
    /// to the catalog title, catalog metres populate size hints, and the
    /// image URL resolves catalog-first with the payload URL as fallback.
    pub fn enrich(&self, items: Vec<ExhibitItem>, assets_base: &str) -> Vec<ExhibitItem> {
        items
            .into_iter()
            .map(|mut item| {
                let id = item.id.trim().to_string();
                let meta = self.entries.get(&id);

                if item.title.trim().is_empty() {
                    if let Some(m) = meta {
                        item.title = m.title.clone();
                    }
                }
                if let Some(m) = meta {
                    item.size_hint_w = m.width_m.or(item.size_hint_w);
                    item.size_hint_h = m.height_m.or(item.size_hint_h);
                }
                if let Some(url) = self.resolve_image_url(&id, assets_base) {
                    item.url = url;
                }
                item
            })
            .collect()
    }
}

/// Rendered frame dimensions for an item: physical hints scale from
/// metres, clamped so outliers don't dwarf or vanish in the room.
pub fn frame_size(item: &ExhibitItem) -> (f32, f32) {
    let w = item
        .size_hint_w
        .map(|m| m * METERS_TO_UNITS)
        .unwrap_or(DEFAULT_FRAME_W)
        .clamp(FRAME_W_RANGE.0, FRAME_W_RANGE.1);
    let h = item
        .size_hint_h
        .map(|m| m * METERS_TO_UNITS)
        .unwrap_or(DEFAULT_FRAME_H)
        .clamp(FRAME_H_RANGE.0, FRAME_H_RANGE.1);
    (w, h)
}

/// Minimal CSV parser: comma-separated, double-quoted fields with `""`
/// escapes, bare CR ignored.
fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => {
                    row.push(std::mem::take(&mut field));
                }
                '\n' => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                '\r' => {}
                _ => field.push(c),
            }
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "catalogF,title,year,width,height,imagefilename,wikimediaurl\n\
F458,Sunflowers,1889,0.92,0.73,F458.jpg,\n\
F587,\"Wheat Field, with Cypresses\",1889,0.93,0.73,,https://upload.wikimedia.org/wheat.jpg\n\
F422,The Sower,1888,,,  ,https://example.com/sower.jpg\n\
,,skipped row,,,,\n";

    fn item(id: &str) -> ExhibitItem {
        ExhibitItem {
            id: id.to_string(),
            title: String::new(),
            reason: String::new(),
            url: String::new(),
            size_hint_w: None,
            size_hint_h: None,
        }
    }

    #[test]
    fn parses_header_and_rows() {
        let cat = Catalog::from_csv(CSV).unwrap();
        assert_eq!(cat.len(), 3);
        let e = cat.get("F458").unwrap();
        assert_eq!(e.title, "Sunflowers");
        assert_eq!(e.width_m, Some(0.92));
        assert_eq!(e.image_file, "F458.jpg");
    }

    #[test]
    fn quoted_field_keeps_comma() {
        let cat = Catalog::from_csv(CSV).unwrap();
        assert_eq!(cat.get("F587").unwrap().title, "Wheat Field, with Cypresses");
    }

    #[test]
    fn missing_id_column_is_an_error() {
        assert!(Catalog::from_csv("title,year\nA,1\n").is_err());
    }

    #[test]
    fn image_url_prefers_local_file() {
        let cat = Catalog::from_csv(CSV).unwrap();
        assert_eq!(
            cat.resolve_image_url("F458", "./assets/GoghDB"),
            Some("./assets/GoghDB/F458.jpg".to_string())
        );
        // No local file: wikimedia upload host accepted.
        assert_eq!(
            cat.resolve_image_url("F587", "./assets/GoghDB"),
            Some("https://upload.wikimedia.org/wheat.jpg".to_string())
        );
        // Non-wikimedia remote rejected.
        assert_eq!(cat.resolve_image_url("F422", "./assets/GoghDB"), None);
    }

    #[test]
    fn enrich_fills_blank_fields_only() {
        let cat = Catalog::from_csv(CSV).unwrap();

        let mut titled = item("F458");
        titled.title = "Custom".to_string();
        let out = cat.enrich(vec![titled, item("F587")], "./assets");

        // Payload title wins when present.
        assert_eq!(out[0].title, "Custom");
        assert_eq!(out[0].size_hint_w, Some(0.92));
        assert_eq!(out[0].url, "./assets/F458.jpg");

        // Blank title falls back to the catalog.
        assert_eq!(out[1].title, "Wheat Field, with Cypresses");
    }

    #[test]
    fn catalog_miss_keeps_payload_fields() {
        let cat = Catalog::from_csv(CSV).unwrap();
        let mut unknown = item("F999");
        unknown.url = "https://example.com/a.jpg".to_string();
        let out = cat.enrich(vec![unknown], "./assets");
        assert_eq!(out[0].url, "https://example.com/a.jpg");
        assert_eq!(out[0].title, "");
    }

    #[test]
    fn frame_size_scales_and_clamps() {
        let mut it = item("x");
        assert_eq!(frame_size(&it), (DEFAULT_FRAME_W, DEFAULT_FRAME_H));

        it.size_hint_w = Some(0.92);
        it.size_hint_h = Some(0.73);
        let (w, h) = frame_size(&it);
        assert!((w - 7.36).abs() < 1e-4);
        assert!((h - 5.84).abs() < 1e-4);

        it.size_hint_w = Some(5.0); // 40 units, clamps to 10
        it.size_hint_h = Some(0.01); // 0.08 units, clamps to 2
        assert_eq!(frame_size(&it), (10.0, 2.0));
    }
}
