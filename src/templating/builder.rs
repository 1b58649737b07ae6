use std::borrow;

use include_dir::{include_dir, Dir};
use liquid::Template;

use super::liquid_exts::{DurationFilterParser, JsonFilterParser};

static TEMPLATE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Lets pages `{% include "layout_header.liquid" %}` straight out of the
/// embedded template directory.
#[derive(Default, Debug, Clone, Copy)]
struct StaticTemplateSource;

impl liquid::partials::PartialSource for StaticTemplateSource {
    fn contains(&self, _name: &str) -> bool {
        true
    }

    fn names(&self) -> Vec<&str> {
        vec![]
    }

    fn try_get<'a>(&'a self, name: &str) -> Option<borrow::Cow<'a, str>> {
        match TEMPLATE_DIR.get_file(name) {
            Some(file) => file.contents_utf8().map(borrow::Cow::from),
            _ => None,
        }
    }
}

pub fn build_and_parse(s: &str) -> Template {
    liquid::ParserBuilder::with_stdlib()
        .filter(DurationFilterParser)
        .filter(JsonFilterParser)
        .partials(liquid::partials::LazyCompiler::<StaticTemplateSource>::empty())
        .build()
        .expect("Problem building the liquid template")
        .parse(s)
        .expect("Problem parsing the liquid template")
}

/// Parse one of the embedded templates.  The templates are compiled into the
/// binary, so a missing or broken one is a build mistake and panics at startup.
pub fn build_and_parse_named(name: &str) -> Template {
    let template_str = TEMPLATE_DIR
        .get_file(name)
        .and_then(|file| file.contents_utf8())
        .unwrap_or_else(|| panic!("Missing embedded template {}", name));
    build_and_parse(template_str)
}

/// Every page the GUI renders, parsed once at startup.
pub struct GuiTemplates {
    pub login: Template,
    pub dashboard_deploy: Template,
    pub deploy_list: Template,
    pub deploybluegreen_select: Template,
    pub thirdparty_list: Template,
    pub thirdparty_edit: Template,
    pub notifier_list: Template,
    pub emailserver_list: Template,
    pub service_list: Template,
    pub service_edit: Template,
}

impl GuiTemplates {
    pub fn build() -> GuiTemplates {
        GuiTemplates {
            login: build_and_parse_named("login.liquid"),
            dashboard_deploy: build_and_parse_named("dashboard_deploy.liquid"),
            deploy_list: build_and_parse_named("deploy_list.liquid"),
            deploybluegreen_select: build_and_parse_named("deploybluegreen_select.liquid"),
            thirdparty_list: build_and_parse_named("thirdparty_list.liquid"),
            thirdparty_edit: build_and_parse_named("thirdparty_edit.liquid"),
            notifier_list: build_and_parse_named("notifier_list.liquid"),
            emailserver_list: build_and_parse_named("emailserver_list.liquid"),
            service_list: build_and_parse_named("service_list.liquid"),
            service_edit: build_and_parse_named("service_edit.liquid"),
        }
    }
}
