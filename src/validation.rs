use std::collections::BTreeMap;

use axum::body::Bytes;
use image::ImageFormat;
use serde::Deserialize;

use crate::entities::movie;

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_COVER_KB: usize = 2048;
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "png", "jpg", "gif", "svg"];

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieForm {
    #[serde(default)]
    pub judul: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub sinopsis: String,
    #[serde(default)]
    pub tahun: String,
    #[serde(default)]
    pub pemain: String,
}

impl MovieForm {
    pub fn category_id(&self) -> Option<i32> {
        self.category_id.trim().parse().ok()
    }
}

impl From<&movie::Model> for MovieForm {
    fn from(m: &movie::Model) -> Self {
        Self {
            judul: m.judul.clone(),
            category_id: m.category_id.to_string(),
            sinopsis: m.sinopsis.clone(),
            tahun: m.tahun.to_string(),
            pemain: m.pemain.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovieFields {
    pub judul: String,
    pub category_id: i32,
    pub sinopsis: String,
    pub tahun: i32,
    pub pemain: String,
}

#[derive(Clone, Debug)]
pub struct CoverImage {
    pub bytes: Bytes,
    pub extension: String,
}

#[derive(Clone, Debug)]
pub struct ValidMovie {
    pub fields: MovieFields,
    pub cover: Option<CoverImage>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn summary(&self) -> String {
        self.0.values().flatten().cloned().collect::<Vec<_>>().join(" ")
    }
}

/// Checks a submitted form. `category_known` tells whether the referenced
/// category exists; it is ignored when `category_id` is not an integer.
pub fn validate(
    form: &MovieForm,
    upload: Option<Upload>,
    category_known: bool,
) -> Result<ValidMovie, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let judul = required(&mut errors, "judul", &form.judul);
    if let Some(judul) = judul {
        if judul.chars().count() > MAX_TITLE_CHARS {
            errors.add(
                "judul",
                format!("The judul field must not be greater than {MAX_TITLE_CHARS} characters."),
            );
        }
    }

    let category_id = required(&mut errors, "category_id", &form.category_id)
        .and_then(|raw| integer(&mut errors, "category_id", raw));
    if category_id.is_some() && !category_known {
        errors.add("category_id", "The selected category_id is invalid.");
    }

    let sinopsis = required(&mut errors, "sinopsis", &form.sinopsis);
    let tahun =
        required(&mut errors, "tahun", &form.tahun).and_then(|raw| integer(&mut errors, "tahun", raw));
    let pemain = required(&mut errors, "pemain", &form.pemain);

    let cover = upload.and_then(|upload| cover_image(&mut errors, upload));

    match (judul, category_id, sinopsis, tahun, pemain) {
        (Some(judul), Some(category_id), Some(sinopsis), Some(tahun), Some(pemain))
            if errors.is_empty() =>
        {
            Ok(ValidMovie {
                fields: MovieFields {
                    judul: judul.to_string(),
                    category_id,
                    sinopsis: sinopsis.to_string(),
                    tahun,
                    pemain: pemain.to_string(),
                },
                cover,
            })
        },
        _ => Err(errors),
    }
}

fn required<'a>(errors: &mut ValidationErrors, field: &'static str, raw: &'a str) -> Option<&'a str> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, format!("The {field} field is required."));
        return None;
    }
    Some(value)
}

fn integer(errors: &mut ValidationErrors, field: &'static str, value: &str) -> Option<i32> {
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, format!("The {field} field must be an integer."));
            None
        },
    }
}

fn cover_image(errors: &mut ValidationErrors, upload: Upload) -> Option<CoverImage> {
    if upload.bytes.len() > MAX_COVER_KB * 1024 {
        errors.add(
            "foto_sampul",
            format!("The foto_sampul field must not be greater than {MAX_COVER_KB} kilobytes."),
        );
        return None;
    }

    let Some(detected) = detect_extension(&upload.bytes) else {
        errors.add("foto_sampul", "The foto_sampul field must be an image.");
        errors.add(
            "foto_sampul",
            format!("The foto_sampul field must be a file of type: {}.", ALLOWED_EXTENSIONS.join(", ")),
        );
        return None;
    };

    let extension = match client_extension(&upload.file_name) {
        Some(ext) if same_kind(&ext, detected) => ext,
        _ => detected.to_string(),
    };

    Some(CoverImage { bytes: upload.bytes, extension })
}

fn client_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn same_kind(ext: &str, detected: &str) -> bool {
    ext == detected || (detected == "jpg" && ext == "jpeg")
}

// Content decides the type, never the client's name or content type.
fn detect_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.is_empty() {
        return None;
    }

    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Some("png"),
        Ok(ImageFormat::Jpeg) => Some("jpg"),
        Ok(ImageFormat::Gif) => Some("gif"),
        Ok(_) => None,
        Err(_) => is_svg(bytes).then_some("svg"),
    }
}

/// The root element must be `<svg`, optionally preceded by an XML
/// declaration, a doctype or comments.
fn is_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(4096)]);
    let mut rest = head.trim_start_matches('\u{feff}').trim_start();

    loop {
        if let Some(after) = rest.strip_prefix("<svg") {
            return after.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/');
        }

        let close = if rest.starts_with("<!--") {
            "-->"
        } else if rest.starts_with("<?") {
            "?>"
        } else if rest.starts_with("<!") {
            ">"
        } else {
            return false;
        };

        match rest.find(close) {
            Some(end) => rest = rest[end + close.len()..].trim_start(),
            None => return false,
        }
    }
}
