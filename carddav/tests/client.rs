// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Client integration tests with wiremock.

use davsync_carddav::{
    AddressBook, AuthMethod, CardDavClient, CardDavConfig, CardDavError, ETag, Url, VCard,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VCARD: &str = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Ada Lovelace\r\nEND:VCARD\r\n";

fn config(mock_server: &MockServer) -> CardDavConfig {
    CardDavConfig {
        base_url: mock_server.uri(),
        home_path: "/dav/addressbooks/user/".to_string(),
        auth: AuthMethod::None,
        ..Default::default()
    }
}

fn address_book(mock_server: &MockServer) -> AddressBook {
    let url = Url::parse(&mock_server.uri())
        .unwrap()
        .join("/dav/addressbooks/user/default/")
        .unwrap();
    AddressBook::new(url)
}

#[tokio::test]
#[ignore = "require network"]
async fn client_discover_address_books() {
    let mock_server = MockServer::start().await;

    // Mock OPTIONS request
    Mock::given(method("OPTIONS"))
        .and(path("/dav/addressbooks/user/"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("DAV", "1, 2, 3, access-control, addressbook"),
        )
        .mount(&mock_server)
        .await;

    // Mock PROPFIND for addressbook-home-set
    Mock::given(method("PROPFIND"))
        .and(path("/dav/addressbooks/user/"))
        .and(header("Content-Type", "application/xml; charset=utf-8"))
        .and(header("Depth", "0"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:carddav\">
  <D:response>
    <D:href>/dav/addressbooks/user/</D:href>
    <D:propstat>
      <D:prop>
        <C:addressbook-home-set>
          <D:href>/dav/addressbooks/user/</D:href>
        </C:addressbook-home-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let client = CardDavClient::new(config(&mock_server)).expect("Failed to create client");
    let result = client.discover().await.expect("Failed to discover");

    assert!(result.supports_address_books);
    assert_eq!(result.address_book_home.as_str(), "/dav/addressbooks/user/");
}

#[tokio::test]
#[ignore = "require network"]
async fn client_sync_account_end_to_end() {
    let mock_server = MockServer::start().await;

    // Address book listing
    Mock::given(method("PROPFIND"))
        .and(path("/dav/addressbooks/user/"))
        .and(header("Depth", "1"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:carddav" xmlns:CS="http://calendarserver.org/ns/">
  <D:response>
    <D:href>/dav/addressbooks/user/</D:href>
    <D:propstat>
      <D:prop><D:resourcetype><D:collection/></D:resourcetype></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/dav/addressbooks/user/default/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Contacts</D:displayname>
        <CS:getctag>ctag-1</CS:getctag>
        <D:resourcetype><D:collection/><C:addressbook/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#,
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    // Supported reports
    Mock::given(method("PROPFIND"))
        .and(path("/dav/addressbooks/user/default/"))
        .and(body_string_contains("supported-report-set"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:carddav">
  <D:response>
    <D:href>/dav/addressbooks/user/default/</D:href>
    <D:propstat>
      <D:prop>
        <D:supported-report-set>
          <D:supported-report><D:report><C:addressbook-multiget/></D:report></D:supported-report>
          <D:supported-report><D:report><D:sync-collection/></D:report></D:supported-report>
        </D:supported-report-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#,
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    // Delta listing
    Mock::given(method("REPORT"))
        .and(path("/dav/addressbooks/user/default/"))
        .and(body_string_contains("sync-collection"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/addressbooks/user/default/ada.vcf</D:href>
    <D:propstat>
      <D:prop><D:getetag>"e1"</D:getetag></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:sync-token>http://example.com/ns/sync/1</D:sync-token>
</D:multistatus>"#,
            "application/xml",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Card bodies
    Mock::given(method("REPORT"))
        .and(path("/dav/addressbooks/user/default/"))
        .and(header("Depth", "1"))
        .and(body_string_contains("addressbook-multiget"))
        .and(body_string_contains(
            "<D:href>/dav/addressbooks/user/default/ada.vcf</D:href>",
        ))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:carddav">
  <D:response>
    <D:href>/dav/addressbooks/user/default/ada.vcf</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>"e1"</D:getetag>
        <C:address-data>BEGIN:VCARD
VERSION:3.0
FN:Ada Lovelace
END:VCARD</C:address-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#,
            "application/xml",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CardDavClient::new(config(&mock_server)).expect("Failed to create client");
    let mut account = client.account().expect("Failed to create account");
    let report = client
        .sync_account(&mut account)
        .await
        .expect("Failed to sync account");

    assert_eq!(report.discovered, 1);
    assert!(report.evictions.is_empty());
    assert_eq!(account.address_books.len(), 1);

    let book = &account.address_books[0];
    assert_eq!(book.display_name.as_deref(), Some("Contacts"));
    assert_eq!(
        book.sync_token.as_ref().unwrap().as_str(),
        "http://example.com/ns/sync/1"
    );
    assert_eq!(book.vcards.len(), 1);
    assert_eq!(book.vcards[0].etag.as_str(), "\"e1\"");
    assert!(book.vcards[0].address_data.contains("FN:Ada Lovelace"));
}

#[tokio::test]
#[ignore = "require network"]
async fn client_sync_account_evicts_failing_address_book() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/addressbooks/user/"))
        .and(header("Depth", "1"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:carddav">
  <D:response>
    <D:href>/dav/addressbooks/user/default/</D:href>
    <D:propstat>
      <D:prop><D:resourcetype><D:collection/><C:addressbook/></D:resourcetype></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#,
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/addressbooks/user/default/"))
        .and(body_string_contains("supported-report-set"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/dav/addressbooks/user/default/</D:href>
    <D:propstat>
      <D:prop><D:supported-report-set/></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#,
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    // The ctag probe fails
    Mock::given(method("PROPFIND"))
        .and(path("/dav/addressbooks/user/default/"))
        .and(body_string_contains("getctag"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = CardDavClient::new(config(&mock_server)).expect("Failed to create client");
    let mut account = client.account().expect("Failed to create account");
    let report = client
        .sync_account(&mut account)
        .await
        .expect("Failed to sync account");

    assert_eq!(report.discovered, 1);
    assert_eq!(report.evictions.len(), 1);
    assert!(account.address_books.is_empty());
}

#[tokio::test]
#[ignore = "require network"]
async fn client_create_card() {
    let mock_server = MockServer::start().await;

    // Mock PUT request
    Mock::given(method("PUT"))
        .and(path("/dav/addressbooks/user/default/ada.vcf"))
        .and(header("if-none-match", "*"))
        .and(header("content-type", "text/vcard; charset=utf-8"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("ETag", "\"new-etag\"")
                .set_body_string(""),
        )
        .mount(&mock_server)
        .await;

    let client = CardDavClient::new(config(&mock_server)).expect("Failed to create client");
    let book = address_book(&mock_server);

    let (url, etag) = client
        .create_card(&book, Some("ada.vcf"), VCARD)
        .await
        .expect("Failed to create card");

    assert_eq!(url.path(), "/dav/addressbooks/user/default/ada.vcf");
    assert_eq!(etag.unwrap().as_str(), "\"new-etag\"");
}

#[tokio::test]
#[ignore = "require network"]
async fn client_update_card_with_stale_etag() {
    let mock_server = MockServer::start().await;

    // Mock PUT request with If-Match
    Mock::given(method("PUT"))
        .and(path("/dav/addressbooks/user/default/ada.vcf"))
        .and(header("if-match", "\"old-etag\""))
        .respond_with(ResponseTemplate::new(412))
        .mount(&mock_server)
        .await;

    let client = CardDavClient::new(config(&mock_server)).expect("Failed to create client");
    let book = address_book(&mock_server);
    let card = VCard {
        url: book.url.join("ada.vcf").unwrap(),
        etag: ETag::from("\"old-etag\""),
        address_data: VCARD.to_string(),
        address_book: book.url.clone(),
    };

    let result = client.update_card(&card).await;

    assert!(matches!(result, Err(CardDavError::PreconditionFailed(_))));
}

#[tokio::test]
#[ignore = "require network"]
async fn client_delete_card() {
    let mock_server = MockServer::start().await;

    // Mock DELETE request
    Mock::given(method("DELETE"))
        .and(path("/dav/addressbooks/user/default/ada.vcf"))
        .and(header("if-match", "\"some-etag\""))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = CardDavClient::new(config(&mock_server)).expect("Failed to create client");
    let book = address_book(&mock_server);
    let card = VCard {
        url: book.url.join("ada.vcf").unwrap(),
        etag: ETag::from("\"some-etag\""),
        address_data: VCARD.to_string(),
        address_book: book.url.clone(),
    };

    client.delete_card(&card).await.expect("Failed to delete card");
}

#[tokio::test]
#[ignore = "require network"]
async fn client_basic_auth_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("OPTIONS"))
        .and(path("/dav/addressbooks/user/"))
        .and(header("authorization", "Basic dXNlcjpwYXNz")) // base64 of "user:pass"
        .respond_with(ResponseTemplate::new(200).insert_header("DAV", "1, 2, addressbook"))
        .mount(&mock_server)
        .await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/addressbooks/user/"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\">
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let config = CardDavConfig {
        auth: AuthMethod::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        },
        ..config(&mock_server)
    };

    let client = CardDavClient::new(config).expect("Failed to create client");
    let result = client.discover().await.expect("Failed to discover");

    assert!(result.supports_address_books);
    assert_eq!(result.address_book_home.as_str(), "/dav/addressbooks/user/");
}

#[tokio::test]
#[ignore = "require network"]
async fn client_discover_rejects_plain_webdav_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("OPTIONS"))
        .and(path("/dav/addressbooks/user/"))
        .respond_with(ResponseTemplate::new(200).insert_header("DAV", "1, 2"))
        .mount(&mock_server)
        .await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/addressbooks/user/"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "<D:multistatus xmlns:D=\"DAV:\"></D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let client = CardDavClient::new(config(&mock_server)).expect("Failed to create client");
    let result = client.discover().await;

    assert!(matches!(result, Err(CardDavError::NotACardDavServer)));
}
