use infra::web::annotation::{request_mapping, rest_controller};

pub struct ReportHttpHandler;

#[rest_controller]
impl ReportHttpHandler {
    #[request_mapping(value = "/reports", method = "FOO")]
    pub fn export(&self) {}
}
