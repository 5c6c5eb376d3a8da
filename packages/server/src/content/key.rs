use serde::Serialize;

/// Display breakdown of a dotted section key,
/// `{page}.{section}[.{instance}].{field}`.
///
/// Keys are free-form, so every part except `page` may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct KeyParts {
    pub page: String,
    pub section: Option<String>,
    pub instance: Option<String>,
    pub field: Option<String>,
}

impl KeyParts {
    pub fn parse(key: &str) -> Self {
        let segments: Vec<&str> = key.split('.').collect();
        let n = segments.len();

        Self {
            page: segments[0].to_owned(),
            section: (n >= 3).then(|| segments[1].to_owned()),
            instance: (n >= 4).then(|| segments[2..n - 1].join(".")),
            field: (n >= 2).then(|| segments[n - 1].to_owned()),
        }
    }
}
