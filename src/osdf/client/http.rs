use super::DocumentClient;
use crate::config::Credentials;
use crate::error::{OsdfError, Result};
use crate::model::{Query, QueryPage, SchemaKind, Validation};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Present on a query response when another page follows.
pub const RESULT_SET_HEADER: &str = "X-OSDF-Query-ResultSet";
/// Carries the server's human-readable reason for a rejected request.
pub const ERROR_HEADER: &str = "X-OSDF-Error";

const TIMEOUT_SECS: u64 = 30;

/// Blocking HTTP client for an OSDF server.
pub struct HttpClient {
    base: Url,
    username: String,
    password: String,
    http: Client,
}

impl HttpClient {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let base = Url::parse(&credentials.base_url()).map_err(|e| {
            OsdfError::ConfigInvalid(format!(
                "invalid server address '{}': {}",
                credentials.address(),
                e
            ))
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds `<base>/<segment>/<segment>...`, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| OsdfError::ConfigInvalid(format!("invalid server address '{}'", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()?;
        debug!(
            status = response.status().as_u16(),
            url = %response.url(),
            "osdf response"
        );
        Ok(response)
    }

    /// Sends `request` and turns any non-success status into an error.
    fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.send(request)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(response))
        }
    }

    fn get_json(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        let response = self.execute(self.http.get(url))?;
        Ok(response.json()?)
    }
}

fn error_message(response: Response) -> String {
    let status = response.status();
    let header = response
        .headers()
        .get(ERROR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    if let Some(message) = header {
        return message;
    }

    let body = response.text().unwrap_or_default().trim().to_string();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        body
    }
}

fn status_error(response: Response) -> OsdfError {
    let status = response.status().as_u16();
    OsdfError::Status {
        status,
        message: error_message(response),
    }
}

/// Statuses with which the validation endpoint rejects the document itself, as opposed to
/// the request (credentials, routing) or the server failing.
fn rejects_document(status: StatusCode) -> bool {
    status.is_client_error()
        && !matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        )
}

/// The new node's id is the last path segment of the `Location` a create answers with.
fn created_id(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn query_segments<'a>(namespace: &'a str, query: &Query, page: &'a str) -> [&'a str; 5] {
    let language = match query {
        Query::Oql(_) => "oql",
        Query::Dsl(_) => "query",
    };
    ["nodes", language, namespace, "page", page]
}

impl DocumentClient for HttpClient {
    fn info(&self) -> Result<Value> {
        self.get_json(&["info"])
    }

    fn node(&self, id: &str, version: Option<u32>) -> Result<Value> {
        match version {
            Some(version) => self.get_json(&["nodes", id, "ver", &version.to_string()]),
            None => self.get_json(&["nodes", id]),
        }
    }

    fn insert_node(&self, node: &Value) -> Result<String> {
        let url = self.endpoint(&["nodes"])?;
        let response = self.execute(self.http.post(url).json(node))?;
        let status = response.status().as_u16();

        if let Some(id) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(created_id)
        {
            return Ok(id);
        }

        let body = response.text()?;
        serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|created| created.get("id").and_then(Value::as_str).map(str::to_string))
            .ok_or_else(|| OsdfError::Status {
                status,
                message: "the server did not report the new node's id".to_string(),
            })
    }

    fn delete_node(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["nodes", id])?;
        self.execute(self.http.delete(url))?;
        Ok(())
    }

    fn validate_node(&self, node: &Value) -> Result<Validation> {
        let url = self.endpoint(&["nodes", "validate"])?;
        let response = self.send(self.http.post(url).json(node))?;
        let status = response.status();

        if status.is_success() {
            Ok(Validation::valid())
        } else if rejects_document(status) {
            Ok(Validation::invalid(error_message(response)))
        } else {
            Err(status_error(response))
        }
    }

    fn edit_node(&self, id: &str, node: &Value) -> Result<()> {
        let url = self.endpoint(&["nodes", id])?;
        self.execute(self.http.put(url).json(node))?;
        Ok(())
    }

    fn query(&self, namespace: &str, query: &Query, page: u32) -> Result<QueryPage> {
        let page_number = page.to_string();
        let url = self.endpoint(&query_segments(namespace, query, &page_number))?;

        let request = match query {
            Query::Oql(text) => self
                .http
                .post(url)
                .header(CONTENT_TYPE, "text/plain")
                .body(text.clone()),
            Query::Dsl(document) => self.http.post(url).json(document),
        };

        let response = self.execute(request)?;
        let has_more = response.headers().contains_key(RESULT_SET_HEADER);
        let mut results: QueryPage = response.json()?;
        results.has_more = has_more;
        Ok(results)
    }

    fn schemas(&self, namespace: &str, kind: SchemaKind) -> Result<Value> {
        match kind {
            SchemaKind::Base => self.get_json(&["namespaces", namespace, "schemas"]),
            SchemaKind::Aux => self.get_json(&["namespaces", namespace, "schemas", "aux"]),
        }
    }

    fn schema(&self, namespace: &str, kind: SchemaKind, name: &str) -> Result<Value> {
        match kind {
            SchemaKind::Base => self.get_json(&["namespaces", namespace, "schemas", name]),
            SchemaKind::Aux => self.get_json(&["namespaces", namespace, "schemas", "aux", name]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// One request as the server saw it.
    struct Seen {
        line: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl Seen {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }
    }

    struct Reply {
        status: u16,
        headers: Vec<(&'static str, String)>,
        body: String,
    }

    fn reply(status: u16, body: &str) -> Reply {
        Reply {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    impl Reply {
        fn header(mut self, name: &'static str, value: &str) -> Self {
            self.headers.push((name, value.to_string()));
            self
        }
    }

    /// Serves `replies` in order, one connection each, on a loopback port. Joining the
    /// handle yields the requests received.
    fn serve(replies: Vec<Reply>) -> (HttpClient, JoinHandle<Vec<Seen>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for reply in replies {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let mut headers = Vec::new();
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).unwrap();
                    let header = header.trim_end();
                    if header.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = header.split_once(':') {
                        headers.push((name.trim().to_string(), value.trim().to_string()));
                    }
                }
                let length = headers
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .map(|(_, value)| value.parse::<usize>().unwrap())
                    .unwrap_or(0);
                let mut body = vec![0; length];
                reader.read_exact(&mut body).unwrap();

                let mut response = format!("HTTP/1.1 {} Stub\r\n", reply.status);
                for (name, value) in &reply.headers {
                    response.push_str(&format!("{}: {}\r\n", name, value));
                }
                response.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.body.len(),
                    reply.body
                ));
                stream.write_all(response.as_bytes()).unwrap();
                stream.flush().unwrap();

                seen.push(Seen {
                    line: line.trim_end().to_string(),
                    headers,
                    body: String::from_utf8(body).unwrap(),
                });
            }
            seen
        });

        let credentials = Credentials::new("127.0.0.1", port, "test", "test", false);
        (HttpClient::new(&credentials).unwrap(), handle)
    }

    fn request_lines(seen: &[Seen]) -> Vec<&str> {
        seen.iter().map(|request| request.line.as_str()).collect()
    }

    fn client(ssl: bool) -> HttpClient {
        HttpClient::new(&Credentials::new("osdf.example.org", 8123, "u", "p", ssl)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let url = client(false).endpoint(&["nodes", "abc", "ver", "3"]).unwrap();
        assert_eq!(url.as_str(), "http://osdf.example.org:8123/nodes/abc/ver/3");
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let url = client(true).endpoint(&["nodes", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "https://osdf.example.org:8123/nodes/a%2Fb%20c");
    }

    #[test]
    fn test_query_segments_pick_language() {
        let oql = query_segments("ihmp", &Query::oql("\"x\"[node_type]"), "2");
        assert_eq!(oql, ["nodes", "oql", "ihmp", "page", "2"]);

        let dsl = query_segments("ihmp", &Query::Dsl(serde_json::json!({})), "1");
        assert_eq!(dsl, ["nodes", "query", "ihmp", "page", "1"]);
    }

    #[test]
    fn test_rejects_document_statuses() {
        assert!(rejects_document(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(rejects_document(StatusCode::BAD_REQUEST));
        assert!(!rejects_document(StatusCode::UNAUTHORIZED));
        assert!(!rejects_document(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_invalid_server_address() {
        let credentials = Credentials::new("bad host name", 8123, "u", "p", false);
        assert!(matches!(
            HttpClient::new(&credentials),
            Err(OsdfError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_created_id_from_location() {
        assert_eq!(
            created_id("http://osdf.example.org:8123/nodes/610a4911a5ca").as_deref(),
            Some("610a4911a5ca")
        );
        assert_eq!(created_id("/nodes/abc/").as_deref(), Some("abc"));
        assert_eq!(created_id(""), None);
    }

    #[test]
    fn test_requests_carry_basic_auth() {
        let (client, server) = serve(vec![reply(200, r#"{"title":"OSDF"}"#)]);

        assert_eq!(client.info().unwrap(), json!({ "title": "OSDF" }));

        let seen = server.join().unwrap();
        assert_eq!(request_lines(&seen), ["GET /info HTTP/1.1"]);
        assert_eq!(seen[0].header("authorization"), Some("Basic dGVzdDp0ZXN0"));
    }

    #[test]
    fn test_node_paths_with_and_without_version() {
        let (client, server) = serve(vec![
            reply(200, r#"{"id":"abc","ver":3}"#),
            reply(200, r#"{"id":"abc","ver":1}"#),
        ]);

        assert_eq!(client.node("abc", None).unwrap()["ver"], 3);
        assert_eq!(client.node("abc", Some(1)).unwrap()["ver"], 1);

        let seen = server.join().unwrap();
        assert_eq!(
            request_lines(&seen),
            ["GET /nodes/abc HTTP/1.1", "GET /nodes/abc/ver/1 HTTP/1.1"]
        );
    }

    #[test]
    fn test_missing_node_reports_error_header() {
        let (client, server) = serve(vec![
            reply(404, "").header(ERROR_HEADER, "Node abc not found")
        ]);

        match client.node("abc", None).unwrap_err() {
            OsdfError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Node abc not found");
            }
            other => panic!("unexpected error: {other}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_server_error_falls_back_to_body() {
        let (client, server) = serve(vec![reply(500, "database offline\n")]);

        match client.delete_node("abc").unwrap_err() {
            OsdfError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "database offline");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(request_lines(&server.join().unwrap()), ["DELETE /nodes/abc HTTP/1.1"]);
    }

    #[test]
    fn test_validation_outcomes() {
        let (client, server) = serve(vec![
            reply(200, ""),
            reply(422, "ignored").header(ERROR_HEADER, "bad linkage"),
            reply(401, "Unauthorized"),
        ]);
        let node = json!({ "node_type": "sample" });

        assert_eq!(client.validate_node(&node).unwrap(), Validation::valid());
        assert_eq!(
            client.validate_node(&node).unwrap(),
            Validation::invalid("bad linkage")
        );
        assert!(matches!(
            client.validate_node(&node).unwrap_err(),
            OsdfError::Status { status: 401, .. }
        ));

        let seen = server.join().unwrap();
        assert!(seen.iter().all(|r| r.line == "POST /nodes/validate HTTP/1.1"));
        assert_eq!(
            serde_json::from_str::<Value>(&seen[0].body).unwrap(),
            node
        );
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_edit_puts_document() {
        let (client, server) = serve(vec![reply(200, "")]);
        let node = json!({ "id": "abc", "ver": 2, "meta": {} });

        client.edit_node("abc", &node).unwrap();

        let seen = server.join().unwrap();
        assert_eq!(request_lines(&seen), ["PUT /nodes/abc HTTP/1.1"]);
        assert_eq!(serde_json::from_str::<Value>(&seen[0].body).unwrap(), node);
    }

    #[test]
    fn test_insert_reads_location() {
        let (client, server) = serve(vec![
            reply(201, "").header("Location", "http://127.0.0.1/nodes/fresh01"),
            reply(201, r#"{"id":"fresh02"}"#),
            reply(201, ""),
        ]);
        let node = json!({ "node_type": "subject" });

        assert_eq!(client.insert_node(&node).unwrap(), "fresh01");
        assert_eq!(client.insert_node(&node).unwrap(), "fresh02");
        assert!(matches!(
            client.insert_node(&node).unwrap_err(),
            OsdfError::Status { status: 201, .. }
        ));

        let seen = server.join().unwrap();
        assert!(seen.iter().all(|r| r.line == "POST /nodes HTTP/1.1"));
        assert_eq!(serde_json::from_str::<Value>(&seen[0].body).unwrap(), node);
    }

    #[test]
    fn test_query_all_follows_result_set_header() {
        let (client, server) = serve(vec![
            reply(206, r#"{"result_count":1,"page":1,"results":[1]}"#)
                .header(RESULT_SET_HEADER, "more"),
            reply(200, r#"{"result_count":1,"page":2,"results":[2]}"#),
        ]);
        let query = Query::oql("\"sample\"[node_type]");

        let all = client.query_all("ns", &query).unwrap();
        assert_eq!(all.results, vec![json!(1), json!(2)]);
        assert_eq!(all.result_count, 2);

        let seen = server.join().unwrap();
        assert_eq!(
            request_lines(&seen),
            [
                "POST /nodes/oql/ns/page/1 HTTP/1.1",
                "POST /nodes/oql/ns/page/2 HTTP/1.1"
            ]
        );
        assert_eq!(seen[0].body, "\"sample\"[node_type]");
        assert_eq!(seen[0].header("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_single_page_reports_more() {
        let (client, server) = serve(vec![
            reply(200, r#"{"result_count":2,"page":1,"results":[1,2]}"#)
                .header(RESULT_SET_HEADER, "more"),
        ]);
        let query = Query::dsl(r#"{"query":{"match_all":{}}}"#).unwrap();

        let page = client.query("ns", &query, 1).unwrap();
        assert!(page.has_more);
        assert_eq!(page.page, Some(1));

        let seen = server.join().unwrap();
        assert_eq!(request_lines(&seen), ["POST /nodes/query/ns/page/1 HTTP/1.1"]);
        assert_eq!(
            serde_json::from_str::<Value>(&seen[0].body).unwrap(),
            json!({ "query": { "match_all": {} } })
        );
    }

    #[test]
    fn test_schema_paths() {
        let (client, server) = serve(vec![
            reply(200, r#"{"project":{}}"#),
            reply(200, r#"{}"#),
            reply(200, r#"{"tags":{}}"#),
            reply(200, r#"{"type":"array"}"#),
        ]);

        client.schemas("ns", SchemaKind::Base).unwrap();
        client.schema("ns", SchemaKind::Base, "project").unwrap();
        client.schemas("ns", SchemaKind::Aux).unwrap();
        assert_eq!(
            client.schema("ns", SchemaKind::Aux, "tags").unwrap(),
            json!({ "type": "array" })
        );

        let seen = server.join().unwrap();
        assert_eq!(
            request_lines(&seen),
            [
                "GET /namespaces/ns/schemas HTTP/1.1",
                "GET /namespaces/ns/schemas/project HTTP/1.1",
                "GET /namespaces/ns/schemas/aux HTTP/1.1",
                "GET /namespaces/ns/schemas/aux/tags HTTP/1.1",
            ]
        );
    }
}
