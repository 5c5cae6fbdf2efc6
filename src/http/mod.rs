//! HTTP building blocks shared by the request handlers.

pub mod mime;
pub mod response;

pub use response::{
    build_404_response, build_500_response, build_501_response, build_file_response,
    build_html_response, build_redirect_response,
};
