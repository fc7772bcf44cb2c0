use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::cloudflare::*;
use crate::error::Error;
use crate::provider::RemoteZone;
use crate::record::{RecordSet, RecordType};

const ZONE_ID: &str = "023e105f4ecef8ad9ca31a8372d0c353";

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
    }))
}

fn page(result: serde_json::Value, page: u32, total_pages: u32) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
        "result_info": {
            "page": page,
            "per_page": 100,
            "total_pages": total_pages,
        },
    }))
}

fn auth() -> Auth {
    Auth::ApiToken("TestToken".to_string())
}

async fn server_with_zone() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("name", "example.com"))
        .and(header("Authorization", "Bearer TestToken"))
        .respond_with(ok(json!([
            { "id": "other", "name": "sub.example.com" },
            { "id": ZONE_ID, "name": "example.com" },
        ])))
        .mount(&server)
        .await;
    server
}

async fn posted_batches(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_cf_open_zone() {
    let server = server_with_zone().await;
    let cf = Cloudflare::open_at(&server.uri(), auth(), "Example.com.")
        .await
        .unwrap();
    assert_eq!(cf.origin().as_str(), "example.com");
}

#[tokio::test]
async fn test_cf_open_zone_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ok(json!([{ "id": "other", "name": "example.com.au" }])))
        .mount(&server)
        .await;

    let err = Cloudflare::open_at(&server.uri(), auth(), "example.com")
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::ZoneNotFound(ref zone) if zone == "example.com"));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_cf_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 9109, "message": "Invalid access token" }],
            "result": null,
        })))
        .mount(&server)
        .await;

    let err = Cloudflare::open_at(&server.uri(), auth(), "example.com")
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::Credential(_)));
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_cf_records_paginated_and_normalized() {
    let server = server_with_zone().await;
    let records_path = format!("/zones/{}/dns_records", ZONE_ID);

    Mock::given(method("GET"))
        .and(path(records_path.as_str()))
        .and(query_param("page", "1"))
        .respond_with(page(
            json!([
                { "id": "1", "name": "www.example.com", "type": "A", "content": "1.2.3.4", "ttl": 300 },
                { "id": "2", "name": "blog.example.com", "type": "CNAME", "content": "www.example.com", "ttl": 300 },
                { "id": "3", "name": "example.com", "type": "MX", "content": "mail.example.com", "priority": 10, "ttl": 3600 },
            ]),
            1,
            2,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(records_path.as_str()))
        .and(query_param("page", "2"))
        .respond_with(page(
            json!([
                { "id": "4", "name": "www.example.com", "type": "A", "content": "1.2.3.5", "ttl": 300 },
                { "id": "5", "name": "example.com", "type": "NS", "content": "ns1.provider.net", "ttl": 86400 },
            ]),
            2,
            2,
        ))
        .mount(&server)
        .await;

    let cf = Cloudflare::open_at(&server.uri(), auth(), "example.com")
        .await
        .unwrap();

    let records = cf.records(&RecordType::SYNC).await.unwrap();
    assert_eq!(
        records,
        vec![
            RecordSet::new("www.example.com", RecordType::A, 300, ["1.2.3.4", "1.2.3.5"]),
            RecordSet::new("blog.example.com", RecordType::CNAME, 300, ["www.example.com"]),
            RecordSet::new("example.com", RecordType::MX, 3600, ["10 mail.example.com"]),
        ]
    );

    let zone = cf.zone().await.unwrap();
    assert_eq!(zone.all_records().len(), 4);
    assert_eq!(zone.records(&[RecordType::NS]).len(), 1);
}

#[tokio::test]
async fn test_cf_create_posts_one_record_per_value() {
    let server = server_with_zone().await;
    Mock::given(method("POST"))
        .and(path(format!("/zones/{}/dns_records/batch", ZONE_ID).as_str()))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let cf = Cloudflare::open_at(&server.uri(), auth(), "example.com")
        .await
        .unwrap();
    let record = RecordSet::new(
        "example.com",
        RecordType::MX,
        3600,
        ["10 mail.example.com", "20 mx.other.net"],
    );
    cf.create(&record).await.unwrap();

    let batches = posted_batches(&server).await;
    assert_eq!(
        batches,
        vec![json!({
            "posts": [
                { "name": "example.com", "type": "MX", "content": "mail.example.com", "ttl": 3600, "priority": 10 },
                { "name": "example.com", "type": "MX", "content": "mx.other.net", "ttl": 3600, "priority": 20 },
            ]
        })]
    );
}

#[tokio::test]
async fn test_cf_update_replaces_existing_records() {
    let server = server_with_zone().await;
    Mock::given(method("GET"))
        .and(path(format!("/zones/{}/dns_records", ZONE_ID).as_str()))
        .and(query_param("name", "www.example.com"))
        .and(query_param("type", "A"))
        .respond_with(ok(json!([
            { "id": "a1", "name": "www.example.com", "type": "A", "content": "5.6.7.8", "ttl": 300 },
            { "id": "a2", "name": "www.example.com", "type": "A", "content": "5.6.7.9", "ttl": 300 },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/zones/{}/dns_records/batch", ZONE_ID).as_str()))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let cf = Cloudflare::open_at(&server.uri(), auth(), "example.com")
        .await
        .unwrap();
    let record = RecordSet::new("www.example.com", RecordType::A, 600, ["1.2.3.4"]);
    cf.update(&record).await.unwrap();

    let batches = posted_batches(&server).await;
    assert_eq!(
        batches,
        vec![json!({
            "deletes": [{ "id": "a1" }, { "id": "a2" }],
            "posts": [
                { "name": "www.example.com", "type": "A", "content": "1.2.3.4", "ttl": 600 },
            ]
        })]
    );
}

#[tokio::test]
async fn test_cf_unsuccessful_batch() {
    let server = server_with_zone().await;
    Mock::given(method("POST"))
        .and(path(format!("/zones/{}/dns_records/batch", ZONE_ID).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 81057, "message": "Record already exists." }],
            "result": null,
        })))
        .mount(&server)
        .await;

    let cf = Cloudflare::open_at(&server.uri(), auth(), "example.com")
        .await
        .unwrap();
    let record = RecordSet::new("www.example.com", RecordType::A, 300, ["1.2.3.4"]);
    let err = cf.create(&record).await.unwrap_err();
    assert!(err.to_string().contains("Record already exists."));
}

#[test]
fn test_cf_record_from_unsyncable_type() {
    let record = RecordSet::new("example.com", RecordType::NS, 300, ["ns1.example.com"]);
    let err = CfRecord::from_record_set(&record).unwrap_err();
    assert!(matches!(err, Error::Provider(_)));
}

#[test]
fn test_cf_record_deserialize() {
    let json = r#"{
        "comment": "hello",
        "content": "42.192.202.2",
        "created_on": "2022-06-08T02:19:45.956932Z",
        "id": "79de548c4af681c2af1a9e92be42d004",
        "meta": {},
        "modified_on": "2022-06-08T02:19:45.956932Z",
        "name": "cn.example.com",
        "proxiable": true,
        "proxied": true,
        "settings": {},
        "tags": [],
        "ttl": 1,
        "type": "A"
    }"#;
    let record: CfRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.id.as_deref(), Some("79de548c4af681c2af1a9e92be42d004"));
    assert_eq!(record.content, "42.192.202.2");
    assert_eq!(record.r#type, "A");
    assert_eq!(record.priority, None);
}

#[test]
fn test_cf_auth_deserialize() {
    let yaml = r#"
type: api_token
value: "1234567890"
        "#;
    let auth: Auth = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(auth, Auth::ApiToken("1234567890".to_string()));

    let yaml = r#"
type: api_key
value:
  email: "test@example.com"
  key: "1234567890"
        "#;
    let auth: Auth = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        auth,
        Auth::ApiKey {
            email: "test@example.com".to_string(),
            key: "1234567890".to_string(),
        }
    );
}
