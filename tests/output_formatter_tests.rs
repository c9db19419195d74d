mod support;

use ddlscope::audit::schema_warnings;
use ddlscope::output::{context, formatter, report};
use support::{parse_fixture, unique_temp_dir};

#[test]
fn formatter_writes_the_same_text_as_the_renderers() {
    let schema = parse_fixture("supabase_blog");
    let warnings = schema_warnings(&schema);

    let out_dir = unique_temp_dir("ddlscope_formatter");
    formatter::write_output(&out_dir, "blog", &schema, &warnings)
        .expect("write_output should succeed");

    let written_context = std::fs::read_to_string(out_dir.join("blog_context.txt"))
        .expect("context file should exist");
    let written_report =
        std::fs::read_to_string(out_dir.join("blog_report.md")).expect("report should exist");

    assert_eq!(
        written_context,
        context::schema_context(&schema),
        "context file should match schema_context exactly"
    );
    assert_eq!(written_report, report::build_report(&schema, &warnings));
    assert!(written_report.contains("- **[ERROR]** 1 table(s) missing primary key: audit_log"));
    assert!(written_report.contains("RLS: disabled"));
}
