//! Theme template rendering.

pub mod handlebars_theme;

pub use handlebars_theme::HandlebarsTheme;
