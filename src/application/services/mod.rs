pub mod certificate_service;
pub mod template_service;
pub mod text_utils;

pub use certificate_service::create_https_certificates;
pub use template_service::{TemplateService, error_page};
pub use text_utils::{
    basic_auth, dedupe_by, fix_basepath, join_args, remove_dict_dupe_from_list, sizeof, strip_http,
};
