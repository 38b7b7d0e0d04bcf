//! End-to-end tests for plan construction.

use assert2::{check, let_assert};
use chrono::{TimeZone, Utc};
use httpgen_core::prelude::*;
use httpgen_core::{
    ContentTypeSource, HeaderOrigin, MultipartBody, Part, QueryPlan, RawOptionsBuilder,
    parse_query,
};

fn fixed_config() -> PlanConfig {
    let instant = Utc
        .with_ymd_and_hms(2006, 1, 2, 15, 4, 5)
        .single()
        .expect("valid date");
    PlanConfig::builder()
        .boundary("test-boundary")
        .clock(FixedClock(instant))
        .build()
}

fn plan(builder: RawOptionsBuilder) -> ResolvedPlan {
    let options = builder.build().expect("valid options");
    build_plan(&options, &fixed_config()).expect("plan")
}

fn content_types(plan: &ResolvedPlan) -> Vec<&HeaderEntry> {
    plan.headers()
        .iter()
        .filter(|entry| entry.is_content_type())
        .collect()
}

#[test]
fn scenario_simple_form_from_raw_data() {
    let plan = plan(RawOptions::builder("http://x/").data("a=1").data("b=2"));

    check!(plan.method() == &Method::Post);
    check!(plan.variant() == Variant::PostSimpleForm);

    let_assert!(BodyPlan::SimpleFormMap(map) = plan.body());
    check!(map.get("a") == Some(&["1".to_string()][..]));
    check!(map.get("b") == Some(&["2".to_string()][..]));

    let content_type = plan.content_type().expect("content type");
    check!(content_type.joined().as_deref() == Some("application/x-www-form-urlencoded"));
    check!(plan.needs(Capability::FormEncoding));
}

#[test]
fn scenario_get_with_data_in_url() {
    let plan = plan(RawOptions::builder("http://x/search").get(true).data("q=test"));

    check!(plan.variant() == Variant::GetDataAsUrlQuery);
    check!(plan.effective_url().literal() == Some("http://x/search?q=test"));
    check!(plan.body().is_none());
    check!(plan.content_type().is_none());
}

#[test]
fn scenario_multipart_upload() {
    let plan = plan(
        RawOptions::builder("http://x/upload")
            .form("file=@/tmp/a.txt")
            .form("note=hi"),
    );

    check!(plan.variant() == Variant::PostMultipartOrConcatenated);
    let_assert!(BodyPlan::Multipart(body) = plan.body());

    let fields: Vec<_> = body.fields().collect();
    check!(fields == [&Part::field("note", "hi")]);

    let files: Vec<_> = body.files().collect();
    check!(
        files
            == [&Part::File {
                name: "file".to_string(),
                path: "/tmp/a.txt".to_string(),
                filename: "a.txt".to_string(),
                content_type: ContentTypeSource::InferFromPath("/tmp/a.txt".to_string()),
            }]
    );

    let content_type = plan.content_type().expect("content type");
    check!(content_type.origin == HeaderOrigin::ContentType);
    check!(content_type.joined().as_deref() == Some("multipart/form-data; boundary=test-boundary"));
    check!(body.boundary() == "test-boundary");
    check!(plan.needs(Capability::Multipart));
    check!(plan.needs(Capability::FileRead));
    check!(plan.needs(Capability::MimeLookup));
    check!(plan.file_upload_count() == 1);
}

#[test]
fn scenario_insecure_get_is_full() {
    let plan = plan(RawOptions::builder("https://x/").insecure(true));

    check!(plan.variant() == Variant::Full);
    check!(plan.method() == &Method::Get);
    check!(plan.transport().insecure_tls);
    check!(plan.body().is_none());
}

#[test]
fn scenario_malformed_form_field() {
    let options = RawOptions::builder("http://x/")
        .form("ok=1")
        .form("bad")
        .build()
        .expect("valid options");

    let_assert!(Err(err) = build_plan(&options, &fixed_config()));
    check!(err.is_malformed_field());
    check!(err.to_string() == "malformed form field 'bad': expected name=value");
}

#[test]
fn form_reference_without_file_name_is_rejected() {
    for value in ["f=@", "f=<"] {
        let options = RawOptions::builder("http://x/")
            .form(value)
            .build()
            .expect("valid options");
        let_assert!(Err(err) = build_plan(&options, &fixed_config()));
        check!(err.is_configuration());
    }
}

#[test]
fn bodyless_requests_never_carry_a_body() {
    for builder in [
        RawOptions::builder("http://x/"),
        RawOptions::builder("http://x/").head(true),
        RawOptions::builder("http://x/").method("DELETE"),
        RawOptions::builder("http://x/").method("POST"),
        RawOptions::builder("http://x/").header("Accept: */*"),
    ] {
        let plan = plan(builder);
        check!(
            [Variant::SimpleGet, Variant::SimpleMethod, Variant::SimplePost]
                .contains(&plan.variant())
        );
        check!(plan.body().is_none());
        check!(plan.variant().is_bodyless());
    }
}

#[test]
fn simple_form_round_trips_through_query_encoding() {
    let plan = plan(
        RawOptions::builder("http://x/")
            .data("tag=a&tag=b")
            .data("name=J%C3%B6rg+M")
            .data("tag=c"),
    );
    check!(plan.variant() == Variant::PostSimpleForm);

    let encoded = plan
        .body()
        .literal()
        .expect("encode")
        .expect("literal body");
    let decoded = parse_query(&encoded).expect("valid query");

    check!(decoded.get("tag") == Some(&["a".to_string(), "b".to_string(), "c".to_string()][..]));
    check!(decoded.get("name") == Some(&["Jörg M".to_string()][..]));
}

#[test]
fn form_values_with_query_syntax_stay_multipart() {
    let plan = plan(
        RawOptions::builder("http://x/")
            .form_string("msg=a&b=c")
            .form("q=1+1"),
    );

    check!(plan.variant() == Variant::PostMultipartOrConcatenated);
    let_assert!(BodyPlan::Multipart(body) = plan.body());
    let fields: Vec<_> = body.fields().collect();
    check!(fields == [&Part::field("msg", "a&b=c"), &Part::field("q", "1+1")]);
}

#[test]
fn building_twice_is_idempotent() {
    let options = RawOptions::builder("http://s3.example.com/bucket/key")
        .aws_v2("AKID:secret")
        .header("X-Trace: 1")
        .form("file=@/tmp/a.txt")
        .build()
        .expect("valid options");
    let config = fixed_config();

    let first = build_plan(&options, &config).expect("plan");
    let second = build_plan(&options, &config).expect("plan");
    check!(first == second);
}

#[test]
fn user_content_type_is_never_duplicated() {
    let cases = [
        (
            RawOptions::builder("http://x/")
                .header("content-type: text/plain")
                .data("hello"),
            "text/plain",
        ),
        (
            RawOptions::builder("http://x/")
                .header("  CONTENT-TYPE :application/x-www-form-urlencoded")
                .data("a=1"),
            "application/x-www-form-urlencoded",
        ),
        (
            RawOptions::builder("http://x/")
                .header("Content-Type: multipart/form-data")
                .form("f=@/tmp/a.txt"),
            "multipart/form-data; boundary=test-boundary",
        ),
        (
            RawOptions::builder("http://x/")
                .header("Content-Type: application/json")
                .insecure(true)
                .data("{}"),
            "application/json",
        ),
    ];

    for (builder, expected) in cases {
        let plan = plan(builder);
        let entries = content_types(&plan);
        check!(entries.len() == 1);
        let entry = entries.first().expect("content type");
        check!(entry.origin == HeaderOrigin::User);
        check!(entry.joined().as_deref() == Some(expected));
    }
}

#[test]
fn aws_v2_signature_with_fixed_clock() {
    let plan = plan(RawOptions::builder("http://s3.example.com/bucket/key").aws_v2("AKID:secret"));

    check!(plan.variant() == Variant::Full);
    let date = plan.header("Date").expect("date");
    check!(date.origin == HeaderOrigin::AwsDate);
    check!(date.joined().as_deref() == Some("Mon, 02 Jan 2006 15:04:05 +0000"));

    let authorization = plan.headers().last().expect("authorization");
    check!(authorization.origin == HeaderOrigin::AwsAuthorization);
    check!(authorization.joined().as_deref() == Some("AWS AKID:+vQICgQ7ysz8z6op9yHjM6MRRNw="));

    let helper = plan.aws_helper().expect("helper");
    check!(helper.path == "/bucket/key");
    check!(helper.content_type.is_empty());
    check!(plan.needs(Capability::HmacSha1));
    check!(plan.needs(Capability::Clock));
}

#[test]
fn aws_v2_signs_the_content_type_sent() {
    let plan = plan(
        RawOptions::builder("http://s3.example.com/upload")
            .aws_v2("AKID:secret")
            .data("a=1"),
    );

    check!(plan.variant() == Variant::Full);
    let helper = plan.aws_helper().expect("helper");
    check!(helper.content_type == "application/x-www-form-urlencoded");
    let authorization = plan.headers().last().expect("authorization");
    check!(authorization.joined().as_deref() == Some("AWS AKID:wXknwdleLPvWBEWxXm0zRxBpcKM="));
}

#[test]
fn aws_v2_malformed_credentials() {
    let options = RawOptions::builder("http://x/")
        .aws_v2("no-colon")
        .build()
        .expect("valid options");
    let_assert!(Err(err) = build_plan(&options, &fixed_config()));
    check!(err.is_configuration());
}

#[test]
fn post_data_as_url_query_keeps_existing_query() {
    let plan = plan(
        RawOptions::builder("http://x/api?v=1")
            .method("POST")
            .get(true)
            .data_binary("@/tmp/q.txt"),
    );

    check!(plan.variant() == Variant::PostDataAsUrlQuery);
    check!(plan.body().is_none());
    let_assert!(Some(QueryPlan::Fragments(fragments)) = plan.effective_url().query());
    check!(fragments.len() == 1);
    check!(plan.effective_url().literal().is_none());
    check!(plan.needs(Capability::FileRead));
}

#[test]
fn warnings_are_collected_on_the_plan() {
    let plan = plan(
        RawOptions::builder("http://x/")
            .header("Broken header")
            .cookie("jar.txt")
            .form("f=@/tmp/a.txt;foo=bar"),
    );

    check!(
        plan.warnings()
            == [
                Warning::MalformedHeader("Broken header".to_string()),
                Warning::MalformedCookie("jar.txt".to_string()),
                Warning::UnknownFormParameter("foo=bar".to_string()),
            ]
    );
}

#[test]
fn variant_and_body_are_consistent() {
    let builders = [
        RawOptions::builder("http://x/").data("a=1"),
        RawOptions::builder("http://x/").data("{}"),
        RawOptions::builder("http://x/").data_binary("@/tmp/a.bin"),
        RawOptions::builder("http://x/").form("a=@/tmp/a.bin"),
        RawOptions::builder("http://x/").form("a="),
        RawOptions::builder("http://x/").get(true).data("a=1"),
        RawOptions::builder("http://x/").user("u:p").form("a=1"),
        RawOptions::builder("http://x/").user("u:p").data("a=1"),
        RawOptions::builder("http://x/").method("PUT").header("X: y").data("a=1"),
    ];
    for builder in builders {
        let plan = plan(builder);
        check!(plan.body().fits(plan.variant()), "{:?} / {:?}", plan.variant(), plan.body());
    }
}

#[test]
fn multipart_reference_encoding_matches_plan() {
    let plan = plan(RawOptions::builder("http://x/").form("file=@/tmp/a.txt").form("note=hi"));
    let_assert!(BodyPlan::Multipart(body) = plan.body());

    let bytes = body
        .encode_with(|_| Ok(b"content".to_vec()))
        .expect("encode");
    let text = String::from_utf8_lossy(&bytes);
    check!(text.starts_with("--test-boundary\r\n"));
    check!(text.ends_with("--test-boundary--\r\n"));

    let empty = MultipartBody::new("test-boundary");
    check!(empty.content_type() == "multipart/form-data; boundary=test-boundary");
}

#[test]
fn plan_serializes_to_json() {
    let plan = plan(RawOptions::builder("http://x/").data("a=1"));
    let json = serde_json::to_value(&plan).expect("json");

    check!(json["variant"] == "post_simple_form");
    check!(json["method"] == "POST");
    check!(json["body"]["kind"] == "simple_form_map");
    check!(json["body"]["value"]["a"][0] == "1");
}
