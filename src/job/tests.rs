// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use super::*;
use crate::types::PipelineError;

#[test]
fn test_split_list() {
    assert_eq!(
        split_list(" https://a.com , ,https://b.com,"),
        vec!["https://a.com".to_string(), "https://b.com".to_string()]
    );
    assert!(split_list("").is_empty());
    assert!(split_list(" , ").is_empty());
}

#[test]
fn test_page_size_parse() {
    assert_eq!("A4".parse::<PageSize>().unwrap(), PageSize::A4);
    assert_eq!("letter".parse::<PageSize>().unwrap(), PageSize::Letter);
    assert_eq!(" LEGAL ".parse::<PageSize>().unwrap(), PageSize::Legal);
    assert_eq!(PageSize::default(), PageSize::A4);
    assert_eq!(PageSize::Tabloid.to_string(), "Tabloid");

    let err = "B5".parse::<PageSize>().unwrap_err();
    assert_eq!(err, PipelineError::InvalidJob("Invalid page size: B5".into()));
}

#[test]
fn test_default_options() {
    let options = RenderOptions::new();
    assert_eq!(options.page_size, PageSize::A4);
    assert!(!options.landscape);
    assert!(options.sections_to_remove.is_empty());
    assert_eq!(options.margins.top, "20px");
    assert_eq!(options.margins.right, "20px");
    assert_eq!(options.margins.bottom, "20px");
    assert_eq!(options.margins.left, "20px");
}

#[test]
fn test_sections_to_remove_are_sanitized() {
    let options = RenderOptions::new().with_sections_to_remove([
        ".cookie-banner",
        " nav > ul ",
        "",
        "body { color: red }",
        "</style><script>",
        "div; x",
    ]);
    assert_eq!(
        options.sections_to_remove,
        vec![".cookie-banner".to_string(), "nav > ul".to_string()]
    );
}

#[test]
fn test_job_from_raw_keeps_order_and_drops_invalid() {
    let job = Job::from_raw(
        Some("Handbook"),
        [
            "https://example.com/b",
            "not-a-url",
            "ftp://example.com/file",
            " https://example.com/a ",
        ],
        RenderOptions::new(),
    )
    .unwrap();
    assert_eq!(job.name, "Handbook");
    let urls: Vec<&str> = job.urls.iter().map(|u| u.as_str()).collect();
    assert_eq!(urls, vec!["https://example.com/b", "https://example.com/a"]);
}

#[test]
fn test_job_from_raw_no_valid_urls() {
    let err = Job::from_raw(None, ["not-a-url", ""], RenderOptions::new()).unwrap_err();
    assert_eq!(err, PipelineError::InvalidJob("No valid URLs provided".into()));

    let empty: Vec<String> = vec![];
    assert!(Job::from_raw(None, empty, RenderOptions::new()).is_err());
}

#[test]
fn test_job_default_name() {
    let job = Job::from_raw(None, ["https://example.com"], RenderOptions::new()).unwrap();
    assert_eq!(job.name, DEFAULT_JOB_NAME);
    let job = Job::from_raw(Some("  "), ["https://example.com"], RenderOptions::new()).unwrap();
    assert_eq!(job.name, DEFAULT_JOB_NAME);
}

#[test]
fn test_job_ids_are_unique() {
    let a = Job::from_raw(None, ["https://example.com"], RenderOptions::new()).unwrap();
    let b = Job::from_raw(None, ["https://example.com"], RenderOptions::new()).unwrap();
    assert_ne!(a.id, b.id);
}
