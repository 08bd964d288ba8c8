//! HTML templates.
//!
//! Templates are stand-alone files under `templates/`, embedded with
//! [`include_str!`] so the binary needs nothing on disk. They are minijinja
//! (Jinja2) templates; names ending in `.html` get HTML auto-escaping.
//! Ids placed in URLs go through the `segment` filter.

use minijinja::Environment;
use serde::Serialize;

use crate::paths;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("templates/layout.html")),
    ("welcome.html", include_str!("templates/welcome.html")),
    ("log/index.html", include_str!("templates/log/index.html")),
    ("log/show.html", include_str!("templates/log/show.html")),
    ("log/edit.html", include_str!("templates/log/edit.html")),
    ("customer/index.html", include_str!("templates/customer/index.html")),
    ("customer/show.html", include_str!("templates/customer/show.html")),
];

/// Compiled template set, built once at startup.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_filter("segment", |id: String| paths::segment(&id));
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }
}
