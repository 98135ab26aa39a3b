//! Integration tests for matching, redirecting and building URLs.

mod common;

use std::sync::Arc;

use common::{map, map_with, route};
use verktyg::config::MapConfig;
use verktyg::routing::{
    params, EndpointPrefix, Environ, MapAdapter, MatchError, Params, RedirectTarget, Route,
    RouteFactory, RouteMatch, RouteTemplate, Submount, Subdomain, UrlMap, Value,
};

fn redirect(result: Result<RouteMatch, MatchError>) -> String {
    match result {
        Err(MatchError::RequestRedirect { new_url }) => new_url,
        other => panic!("expected redirect, got {other:?}"),
    }
}

fn matched(result: Result<RouteMatch, MatchError>) -> (String, Params) {
    let found = result.unwrap();
    (found.endpoint, found.params)
}

#[test]
fn test_basic_routing() {
    let map = map(vec![
        route("/", "index"),
        route("/foo", "foo"),
        route("/bar/", "bar"),
    ]);
    let adapter = map.bind("example.org", None).unwrap();

    assert_eq!(matched(adapter.match_path("/")), ("index".to_string(), Params::new()));
    assert_eq!(matched(adapter.match_path("/foo")).0, "foo");
    assert_eq!(matched(adapter.match_path("/bar/")).0, "bar");
    assert_eq!(redirect(adapter.match_path("/bar")), "http://example.org/bar/");
    assert_eq!(adapter.match_path("/blub").unwrap_err(), MatchError::NotFound);

    assert_eq!(
        redirect(adapter.match_with_query("/bar", Some("aha=muhaha"))),
        "http://example.org/bar/?aha=muhaha"
    );

    let adapter = adapter.with_script_name("/test");
    assert_eq!(redirect(adapter.match_path("/bar")), "http://example.org/test/bar/");
}

#[test]
fn test_query_params_carried_onto_redirect() {
    let map = map(vec![route("/bar/", "bar")]);
    let adapter = map
        .bind("example.org", None)
        .unwrap()
        .with_query_params(&params([("aha", "muhaha")]));

    assert_eq!(
        redirect(adapter.match_path("/bar")),
        "http://example.org/bar/?aha=muhaha"
    );
}

#[test]
fn test_bind_to_environ_redirect_keeps_query() {
    let map = map(vec![route("/bar/", "bar")]);
    let url = url::Url::parse("http://example.org/bar?foo=bar").unwrap();
    let adapter = map.bind_to_environ(&Environ::from_url(&url), None, None).unwrap();

    assert_eq!(redirect(adapter.match_current()), "http://example.org/bar/?foo=bar");
}

#[test]
fn test_environ_defaults() {
    let map = map(vec![route("/foo", "foo"), route("/bar", "bar")]);
    let environ = Environ {
        path_info: "/foo".to_string(),
        ..Environ::default()
    };
    let adapter = map.bind_to_environ(&environ, None, None).unwrap();

    assert_eq!(adapter.server_name(), "localhost");
    assert_eq!(matched(adapter.match_path("/foo")).0, "foo");
    assert_eq!(matched(adapter.match_current()).0, "foo");
    assert_eq!(matched(adapter.match_path("/bar")).0, "bar");
    assert_eq!(adapter.match_path("/bars").unwrap_err(), MatchError::NotFound);
}

#[test]
fn test_nonascii_path_info() {
    let map = map(vec![route("/", "index"), route("/лошадь", "horse")]);
    let adapter = map.bind("localhost", None).unwrap();

    assert_eq!(matched(adapter.match_path("/")).0, "index");
    assert_eq!(matched(adapter.match_path("/лошадь")).0, "horse");
    assert_eq!(adapter.match_path("/барсук").unwrap_err(), MatchError::NotFound);
}

#[test]
fn test_basic_building() {
    let map = map(vec![
        route("/", "index"),
        route("/foo", "foo"),
        route("/bar/<baz>", "bar"),
        route("/bar/<int:bazi>", "bari"),
        route("/bar/<float:bazf>", "barf"),
        route("/bar/<path:bazp>", "barp"),
        route("/hehe", "blah").with_subdomain("blah"),
    ]);
    let adapter = map.bind("example.org", Some("blah")).unwrap();

    assert_eq!(adapter.build("index", &Params::new()).unwrap(), "http://example.org/");
    assert_eq!(adapter.build("foo", &Params::new()).unwrap(), "http://example.org/foo");
    assert_eq!(
        adapter.build("bar", &params([("baz", "blub")])).unwrap(),
        "http://example.org/bar/blub"
    );
    assert_eq!(
        adapter.build("bari", &params([("bazi", 50)])).unwrap(),
        "http://example.org/bar/50"
    );
    assert_eq!(
        adapter.build("barf", &params([("bazf", 0.815)])).unwrap(),
        "http://example.org/bar/0.815"
    );
    assert_eq!(
        adapter.build("barp", &params([("bazp", "la/di")])).unwrap(),
        "http://example.org/bar/la/di"
    );
    assert_eq!(adapter.build("blah", &Params::new()).unwrap(), "/hehe");
    assert!(adapter.build("urks", &Params::new()).is_err());

    let adapter = adapter.with_script_name("/test");
    assert_eq!(adapter.build("index", &Params::new()).unwrap(), "http://example.org/test/");
    assert_eq!(
        adapter.build("barp", &params([("bazp", "la/di")])).unwrap(),
        "http://example.org/test/bar/la/di"
    );
    assert_eq!(adapter.build("blah", &Params::new()).unwrap(), "/test/hehe");
}

#[test]
fn test_defaults() {
    let map = map(vec![
        route("/foo/", "foo").with_defaults(params([("page", 1)])),
        route("/foo/<int:page>", "foo"),
    ]);
    let adapter = map.bind("example.org", None).unwrap();

    assert_eq!(matched(adapter.match_path("/foo/")).1, params([("page", 1)]));
    assert_eq!(redirect(adapter.match_path("/foo/1")), "http://example.org/foo/");
    assert_eq!(matched(adapter.match_path("/foo/2")).1, params([("page", 2)]));

    assert_eq!(adapter.build("foo", &Params::new()).unwrap(), "/foo/");
    assert_eq!(adapter.build("foo", &params([("page", 1)])).unwrap(), "/foo/");
    assert_eq!(adapter.build("foo", &params([("page", 2)])).unwrap(), "/foo/2");
}

#[test]
fn test_greedy() {
    let map = map(vec![
        route("/foo", "foo"),
        route("/<path:bar>", "bar"),
        route("/<path:bar>/<path:blub>", "bar"),
    ]);
    let adapter = map.bind("example.org", None).unwrap();

    assert_eq!(matched(adapter.match_path("/foo")).0, "foo");
    assert_eq!(
        matched(adapter.match_path("/blub")),
        ("bar".to_string(), params([("bar", "blub")]))
    );
    assert_eq!(
        matched(adapter.match_path("/he/he")),
        ("bar".to_string(), params([("bar", "he"), ("blub", "he")]))
    );

    assert_eq!(adapter.build("foo", &Params::new()).unwrap(), "/foo");
    assert_eq!(adapter.build("bar", &params([("bar", "blub")])).unwrap(), "/blub");
    assert_eq!(
        adapter
            .build("bar", &params([("bar", "blub"), ("blub", "bar")]))
            .unwrap(),
        "/blub/bar"
    );
}

#[test]
fn test_wiki_paths() {
    let map = map(vec![
        route("/", "page").with_defaults(params([("name", "FrontPage")])),
        route("/Special", "special"),
        route("/<int:year>", "year"),
        route("/<path:name>", "page"),
        route("/<path:name>/edit", "editpage"),
        route("/<path:name>/silly/<path:name2>", "sillypage"),
        route("/<path:name>/silly/<path:name2>/edit", "editsillypage"),
        route("/Talk:<path:name>", "talk"),
        route("/User:<username>", "user"),
        route("/User:<username>/<path:name>", "userpage"),
        route("/Files/<path:file>", "files"),
    ]);
    let adapter = map.bind("example.org", None).unwrap();

    let cases = [
        ("/", "page", params([("name", "FrontPage")])),
        ("/Special", "special", Params::new()),
        ("/2007", "year", params([("year", 2007)])),
        ("/Some/Page", "page", params([("name", "Some/Page")])),
        ("/Some/Page/edit", "editpage", params([("name", "Some/Page")])),
        ("/Foo/silly/bar", "sillypage", params([("name", "Foo"), ("name2", "bar")])),
        (
            "/Foo/silly/bar/edit",
            "editsillypage",
            params([("name", "Foo"), ("name2", "bar")]),
        ),
        ("/Talk:Foo/Bar", "talk", params([("name", "Foo/Bar")])),
        ("/User:thomas", "user", params([("username", "thomas")])),
        (
            "/User:thomas/projects/werkzeug",
            "userpage",
            params([("username", "thomas"), ("name", "projects/werkzeug")]),
        ),
        (
            "/Files/downloads/werkzeug/0.2.zip",
            "files",
            params([("file", "downloads/werkzeug/0.2.zip")]),
        ),
    ];
    for (path, endpoint, values) in cases {
        assert_eq!(
            matched(adapter.match_path(path)),
            (endpoint.to_string(), values),
            "matching {path}"
        );
    }

    assert_eq!(redirect(adapter.match_path("/FrontPage")), "http://example.org/");
}

#[test]
fn test_complex_routing() {
    let map = map(vec![
        route("/", "index"),
        route("/<int:blub>", "an_int"),
        route("/<blub>", "a_string"),
        route("/foo/", "nested"),
        route("/foobar/", "nestedbar"),
        route("/foo/<path:testing>/", "nested_show"),
        route("/foo/<path:testing>/edit", "nested_edit"),
        route("/users/", "users").with_defaults(params([("page", 1)])),
        route("/users/page/<int:page>", "users"),
        route("/foox", "foox"),
        route("/<path:bar>/<path:blub>", "barx_path_path"),
    ]);
    let adapter = map.bind("example.com", None).unwrap();

    assert_eq!(matched(adapter.match_path("/")).0, "index");
    assert_eq!(matched(adapter.match_path("/42")).1, params([("blub", 42)]));
    assert_eq!(matched(adapter.match_path("/blub")).1, params([("blub", "blub")]));
    assert_eq!(matched(adapter.match_path("/foo/")).0, "nested");
    assert_eq!(matched(adapter.match_path("/foobar/")).0, "nestedbar");
    assert_eq!(
        matched(adapter.match_path("/foo/1/2/3/")),
        ("nested_show".to_string(), params([("testing", "1/2/3")]))
    );
    assert_eq!(
        matched(adapter.match_path("/foo/1/2/3/edit")),
        ("nested_edit".to_string(), params([("testing", "1/2/3")]))
    );
    assert_eq!(matched(adapter.match_path("/users/")).1, params([("page", 1)]));
    assert_eq!(matched(adapter.match_path("/users/page/2")).1, params([("page", 2)]));
    assert_eq!(matched(adapter.match_path("/foox")).0, "foox");
    assert_eq!(
        matched(adapter.match_path("/1/2/3")),
        (
            "barx_path_path".to_string(),
            params([("bar", "1"), ("blub", "2/3")])
        )
    );

    assert_eq!(adapter.build("index", &Params::new()).unwrap(), "/");
    assert_eq!(adapter.build("an_int", &params([("blub", 42)])).unwrap(), "/42");
    assert_eq!(adapter.build("a_string", &params([("blub", "test")])).unwrap(), "/test");
    assert_eq!(adapter.build("nestedbar", &Params::new()).unwrap(), "/foobar/");
    assert_eq!(
        adapter.build("nested_show", &params([("testing", "1/2/3")])).unwrap(),
        "/foo/1/2/3/"
    );
    assert_eq!(adapter.build("users", &params([("page", 1)])).unwrap(), "/users/");
    assert_eq!(adapter.build("users", &params([("page", 2)])).unwrap(), "/users/page/2");
    assert_eq!(
        adapter
            .build("barx_path_path", &params([("bar", "1"), ("blub", "2/3")]))
            .unwrap(),
        "/1/2/3"
    );
}

#[test]
fn test_http_host_before_server_name() {
    let map = map(vec![route("/", "index").with_subdomain("wiki")]);
    let mut environ = Environ {
        http_host: Some("wiki.example.com".to_string()),
        server_name: "web0.example.com".to_string(),
        path_info: String::new(),
        ..Environ::default()
    };

    let adapter = map
        .bind_to_environ(&environ, Some("example.com"), None)
        .unwrap();
    assert_eq!(matched(adapter.match_path("/")).0, "index");
    assert_eq!(
        adapter.build_with("index", &Params::new(), true, true).unwrap(),
        "http://wiki.example.com/"
    );
    assert_eq!(adapter.build("index", &Params::new()).unwrap(), "/");

    environ.http_host = Some("admin.example.com".to_string());
    let adapter = map
        .bind_to_environ(&environ, Some("example.com"), None)
        .unwrap();
    assert_eq!(
        adapter.build("index", &Params::new()).unwrap(),
        "http://wiki.example.com/"
    );
}

#[test]
fn test_query_parameter_sort_key() {
    let mut map = UrlMap::new(MapConfig {
        sort_parameters: true,
        ..MapConfig::default()
    });
    map.set_sort_key(Arc::new(|a: &(String, Value), b: &(String, Value)| {
        a.1.as_int().cmp(&b.1.as_int())
    }));
    map.add_routes(route("/", "index")).unwrap();

    let adapter = map.bind("localhost", None).unwrap();
    assert_eq!(
        adapter
            .build_with("index", &params([("x", 20), ("y", 10), ("z", 30)]), true, true)
            .unwrap(),
        "http://localhost/?y=10&x=20&z=30"
    );
}

#[test]
fn test_redirect_quotes_unicode_path() {
    let map = map(vec![route("/öäü/", "umlauts")]);
    let adapter = map.bind("localhost", None).unwrap();

    assert_eq!(
        redirect(adapter.match_path("/öäü")),
        "http://localhost/%C3%B6%C3%A4%C3%BC/"
    );
}

#[test]
fn test_default_redirect() {
    let map = map(vec![
        route("/foo", "foo").with_defaults(params([("bar", 42)])),
        route("/foo/<int:bar>", "foo"),
    ]);
    let adapter = map.bind("localhost", None).unwrap();

    assert_eq!(redirect(adapter.match_path("/foo/42")), "http://localhost/foo");
    assert_eq!(matched(adapter.match_path("/foo/41")).1, params([("bar", 41)]));
}

#[test]
fn test_default_redirect_across_subdomains() {
    let map = map(vec![
        route("/foo", "foo")
            .with_defaults(params([("bar", 42)]))
            .with_subdomain("test"),
        route("/foo/<int:bar>", "foo").with_subdomain("other"),
    ]);
    let adapter = map.bind("localhost", Some("other")).unwrap();

    assert_eq!(redirect(adapter.match_path("/foo/42")), "http://test.localhost/foo");
}

#[test]
fn test_default_redirect_disabled() {
    let map = map_with(
        MapConfig {
            redirect_defaults: false,
            ..MapConfig::default()
        },
        vec![
            route("/foo", "foo").with_defaults(params([("bar", 42)])),
            route("/foo/<int:bar>", "foo"),
        ],
    );
    let adapter = map.bind("localhost", None).unwrap();

    assert_eq!(matched(adapter.match_path("/foo/42")).1, params([("bar", 42)]));
}

#[test]
fn test_match_returns_route() {
    let map = map(vec![route("/foo/", "foo")]);
    let adapter = map.bind("localhost", None).unwrap();

    let found = adapter.match_path("/foo/").unwrap();
    assert_eq!(found.route.rule(), "/foo/");
    assert!(found.params.is_empty());
}

#[test]
fn test_server_name_interpolation() {
    let map = map(vec![
        route("/", "index"),
        route("/", "alt").with_subdomain("alt"),
    ]);
    let environ = |url: &str| Environ::from_url(&url::Url::parse(url).unwrap());

    let adapter = map
        .bind_to_environ(&environ("http://example.invalid/"), Some("example.invalid"), None)
        .unwrap();
    assert_eq!(matched(adapter.match_current()).0, "index");

    let adapter = map
        .bind_to_environ(&environ("http://alt.example.invalid/"), Some("example.invalid"), None)
        .unwrap();
    assert_eq!(matched(adapter.match_current()).0, "alt");

    let adapter = map
        .bind_to_environ(&environ("http://example.invalid/"), Some("foo"), None)
        .unwrap();
    assert_eq!(adapter.subdomain(), Some("<invalid>"));
}

#[test]
fn test_route_templates() {
    let template = RouteTemplate::new(vec![
        Submount::new(
            "/test/$app",
            vec![
                route("/foo/", "handle_foo"),
                route("/bar/", "handle_bar"),
                route("/baz/", "handle_baz"),
            ],
        )
        .boxed(),
        EndpointPrefix::new(
            "${app}",
            vec![route("/${app}-blah", "bar"), route("/${app}-meh", "baz")],
        )
        .boxed(),
        Subdomain::new("$app", vec![route("/blah", "x_bar"), route("/meh", "x_baz")]).boxed(),
    ]);

    let map = UrlMap::with_routes(
        MapConfig::default(),
        ["test1", "test2", "test3", "test4"]
            .into_iter()
            .map(|app| template.apply([("app", app)]))
            .collect::<Vec<_>>(),
    )
    .unwrap();

    let mut out: Vec<(String, String, String)> = map
        .iter_routes(None)
        .map(|r| {
            (
                r.rule().to_string(),
                r.subdomain().unwrap_or_default().to_string(),
                r.endpoint().to_string(),
            )
        })
        .collect();
    out.sort();

    let mut expected = Vec::new();
    for (rule, endpoint) in [("/blah", "x_bar"), ("/meh", "x_baz")] {
        for app in ["test1", "test2", "test3", "test4"] {
            expected.push((rule.to_string(), app.to_string(), endpoint.to_string()));
        }
    }
    for app in ["test1", "test2", "test3", "test4"] {
        for name in ["bar", "baz", "foo"] {
            expected.push((
                format!("/test/{app}/{name}/"),
                String::new(),
                format!("handle_{name}"),
            ));
        }
    }
    for app in ["test1", "test2", "test3", "test4"] {
        expected.push((format!("/{app}-blah"), String::new(), format!("{app}bar")));
        expected.push((format!("/{app}-meh"), String::new(), format!("{app}baz")));
    }

    assert_eq!(out, expected);
}

#[test]
fn test_non_string_parts() {
    let map = map(vec![route("/<foo>", "foo")]);
    let adapter = map.bind("example.com", None).unwrap();

    assert_eq!(adapter.build("foo", &params([("foo", 42)])).unwrap(), "/42");
}

#[test]
fn test_uuid_converter() {
    let map = map(vec![route("/a/<uuid:a_uuid>", "a")]);
    let adapter = map.bind("example.org", None).unwrap();

    let (_, values) = matched(adapter.match_path("/a/a8098c1a-f86e-11da-bd1a-00112444be1e"));
    assert!(values["a_uuid"].as_uuid().is_some());
}

#[test]
fn test_build_append_unknown() {
    let map = map(vec![route("/bar/<float:bazf>", "barf")]);
    let adapter = map.bind("example.org", Some("blah")).unwrap();
    let values = params([("bazf", 0.815), ("bif", 1.0)]);

    assert_eq!(
        adapter.build("barf", &values).unwrap(),
        "http://example.org/bar/0.815?bif=1.0"
    );
    assert_eq!(
        adapter.build_with("barf", &values, false, false).unwrap(),
        "http://example.org/bar/0.815"
    );
}

#[test]
fn test_colon_in_value() {
    let map = map(vec![route("/<foo>", "x")]);
    let adapter = map.bind("example.org", None).unwrap();
    let values = params([("foo", "x:y")]);

    assert_eq!(adapter.build("x", &values).unwrap(), "/x:y");
    assert_eq!(
        adapter.build_with("x", &values, true, true).unwrap(),
        "http://example.org/x:y"
    );
}

#[test]
fn test_external_building_with_port() {
    let map = map(vec![route("/", "index")]);

    let adapter = map.bind("example.org:5000", None).unwrap();
    assert_eq!(
        adapter.build_with("index", &Params::new(), true, true).unwrap(),
        "http://example.org:5000/"
    );

    let environ = Environ::from_url(&url::Url::parse("http://example.org:5000/").unwrap());
    let adapter = map
        .bind_to_environ(&environ, Some("example.org:5000"), None)
        .unwrap();
    assert_eq!(
        adapter.build_with("index", &Params::new(), true, true).unwrap(),
        "http://example.org:5000/"
    );

    let adapter = map.bind_to_environ(&environ, Some("example.org"), None).unwrap();
    assert_eq!(adapter.subdomain(), Some("<invalid>"));
}

#[test]
fn test_alias_redirects() {
    let map = map(vec![
        route("/", "index"),
        route("/index.html", "index").with_alias(true),
        route("/users/", "users").with_defaults(params([("page", 1)])),
        route("/users/index.html", "users")
            .with_defaults(params([("page", 1)]))
            .with_alias(true),
        route("/users/page/<int:page>", "users"),
        route("/users/page-<int:page>.html", "users").with_alias(true),
    ]);
    let adapter = map.bind("example.com", None).unwrap();

    let cases = [
        ("/index.html", None, "http://example.com/"),
        ("/users/index.html", None, "http://example.com/users/"),
        ("/users/page-2.html", None, "http://example.com/users/page/2"),
        ("/users/page-1.html", None, "http://example.com/users/"),
        ("/users/page-1.html", Some("foo=bar"), "http://example.com/users/?foo=bar"),
    ];
    for (path, query, expected) in cases {
        assert_eq!(redirect(adapter.match_with_query(path, query)), expected);
    }

    assert_eq!(adapter.build("index", &Params::new()).unwrap(), "/");
    assert_eq!(adapter.build("users", &params([("page", 1)])).unwrap(), "/users/");
    assert_eq!(adapter.build("users", &params([("page", 2)])).unwrap(), "/users/page/2");
}

#[test]
fn test_alias_without_canonical_route() {
    let map = map(vec![route("/old", "x").with_alias(true)]);
    let adapter = map.bind("example.com", None).unwrap();

    let err = adapter.match_path("/old").unwrap_err();
    assert!(matches!(err, MatchError::Build(_)));
    assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.redirect_url(), None);
}

#[test]
fn test_build_then_match_roundtrip() {
    let map = map(vec![
        route("/", "index"),
        route("/users/<int:id>", "user"),
        route("/users/<int:id>/<name>", "user_named"),
        route("/prices/<float:amount>", "price"),
        route("/objects/<uuid:key>", "object"),
        route("/docs/<path:page>", "docs"),
        route("/status/<int:code>", "status").with_subdomain("api"),
    ]);
    let object_key: uuid::Uuid = "a8098c1a-f86e-11da-bd1a-00112444be1e".parse().unwrap();

    let mut user_named = Params::new();
    user_named.insert("id".to_string(), Value::Int(7));
    user_named.insert("name".to_string(), Value::from("jane doe"));

    let cases = [
        ("index", Params::new()),
        ("user", params([("id", 42)])),
        ("user_named", user_named),
        ("price", params([("amount", 12.5)])),
        ("object", params([("key", object_key)])),
        ("docs", params([("page", "guide/install notes")])),
    ];

    for script_name in ["/", "/app"] {
        let adapter = map
            .bind("example.com", None)
            .unwrap()
            .with_script_name(script_name);
        for (endpoint, values) in &cases {
            let built = adapter.build(endpoint, values).unwrap();
            let path = built
                .strip_prefix(adapter.script_name())
                .unwrap_or_else(|| panic!("{built} outside {script_name}"));
            let path = percent_encoding::percent_decode_str(path).decode_utf8().unwrap();

            let (found, found_values) = matched(adapter.match_path(&format!("/{path}")));
            assert_eq!(&found, endpoint, "{built}");
            assert_eq!(&found_values, values, "{built}");
        }
    }

    let adapter = map.bind("example.com", None).unwrap();
    let values = params([("code", 503)]);
    let built = url::Url::parse(&adapter.build("status", &values).unwrap()).unwrap();
    assert_eq!(built.host_str(), Some("api.example.com"));

    let api = map.bind("example.com", Some("api")).unwrap();
    assert_eq!(
        matched(api.match_path(built.path())),
        ("status".to_string(), values)
    );
}

#[test]
fn test_double_defaults() {
    for prefix in ["", "/aaa"] {
        let map = map(vec![
            route(&format!("{prefix}/"), "x").with_defaults(params([
                ("foo", Value::Int(1)),
                ("bar", Value::Bool(false)),
            ])),
            route(&format!("{prefix}/<int:foo>"), "x").with_defaults(params([("bar", false)])),
            route(&format!("{prefix}/bar/"), "x").with_defaults(params([
                ("foo", Value::Int(1)),
                ("bar", Value::Bool(true)),
            ])),
            route(&format!("{prefix}/bar/<int:foo>"), "x").with_defaults(params([("bar", true)])),
        ]);
        let adapter = map.bind("example.com", None).unwrap();
        let values = |foo: Option<i64>, bar: bool| {
            let mut values = Params::new();
            if let Some(foo) = foo {
                values.insert("foo".to_string(), Value::Int(foo));
            }
            values.insert("bar".to_string(), Value::Bool(bar));
            values
        };

        assert_eq!(
            matched(adapter.match_path(&format!("{prefix}/"))).1,
            values(Some(1), false)
        );
        assert_eq!(
            matched(adapter.match_path(&format!("{prefix}/2"))).1,
            values(Some(2), false)
        );
        assert_eq!(
            matched(adapter.match_path(&format!("{prefix}/bar/"))).1,
            values(Some(1), true)
        );
        assert_eq!(
            matched(adapter.match_path(&format!("{prefix}/bar/2"))).1,
            values(Some(2), true)
        );

        let build = |v: Params| adapter.build("x", &v).unwrap();
        assert_eq!(build(values(Some(1), false)), format!("{prefix}/"));
        assert_eq!(build(values(Some(2), false)), format!("{prefix}/2"));
        assert_eq!(build(values(None, false)), format!("{prefix}/"));
        assert_eq!(build(values(Some(1), true)), format!("{prefix}/bar/"));
        assert_eq!(build(values(Some(2), true)), format!("{prefix}/bar/2"));
        assert_eq!(build(values(None, true)), format!("{prefix}/bar/"));
    }
}

#[test]
fn test_host_matching() {
    let map = map_with(
        MapConfig {
            host_matching: true,
            ..MapConfig::default()
        },
        vec![
            route("/", "index").with_host("www.<domain>"),
            route("/", "files").with_host("files.<domain>"),
            route("/foo/", "x")
                .with_defaults(params([("page", 1)]))
                .with_host("www.<domain>"),
            route("/<int:page>", "x").with_host("files.<domain>"),
        ],
    );

    let adapter = map.bind("www.example.com", None).unwrap();
    assert_eq!(
        matched(adapter.match_path("/")),
        ("index".to_string(), params([("domain", "example.com")]))
    );
    assert_eq!(
        matched(adapter.match_path("/foo/")).1,
        params([("domain", Value::from("example.com")), ("page", Value::Int(1))])
    );
    assert_eq!(redirect(adapter.match_path("/foo")), "http://www.example.com/foo/");

    let adapter = map.bind("files.example.com", None).unwrap();
    assert_eq!(matched(adapter.match_path("/")).0, "files");
    assert_eq!(
        matched(adapter.match_path("/2")).1,
        params([("domain", Value::from("example.com")), ("page", Value::Int(2))])
    );
    assert_eq!(redirect(adapter.match_path("/1")), "http://www.example.com/foo/");

    assert!(map.bind("www.example.com", Some("www")).is_err());
}

#[test]
fn test_server_name_casing() {
    let map = map(vec![route("/", "index").with_subdomain("foo")]);

    let environ = Environ {
        http_host: Some("FOO.EXAMPLE.COM".to_string()),
        server_name: "FOO.EXAMPLE.COM".to_string(),
        ..Environ::default()
    };
    let adapter = map.bind_to_environ(&environ, Some("example.com"), None).unwrap();
    assert_eq!(matched(adapter.match_path("/")).0, "index");

    let environ = Environ {
        http_host: None,
        server_name: "127.0.0.1".to_string(),
        server_port: "5000".to_string(),
        ..Environ::default()
    };
    let adapter = map.bind_to_environ(&environ, Some("example.com"), None).unwrap();
    assert_eq!(adapter.match_current().unwrap_err(), MatchError::NotFound);
}

#[test]
fn test_redirect_path_quoting() {
    let map = map(vec![
        route("/<category>", "category").with_defaults(params([("page", 1)])),
        route("/<category>/page/<int:page>", "category"),
    ]);
    let adapter = map.bind("example.com", None).unwrap();

    assert_eq!(
        redirect(adapter.match_path("/foo bar/page/1")),
        "http://example.com/foo%20bar"
    );
}

#[test]
fn test_unicode_routes() {
    let map = map(vec![route("/войти/", "enter"), route("/foo+bar/", "foobar")]);
    let adapter = map.bind("☃.example.com", None).unwrap();

    assert_eq!(
        redirect(adapter.match_path("/войти")),
        "http://xn--n3h.example.com/%D0%B2%D0%BE%D0%B9%D1%82%D0%B8/"
    );
    assert_eq!(
        matched(adapter.match_path("/войти/")),
        ("enter".to_string(), Params::new())
    );
    assert_eq!(
        redirect(adapter.match_path("/foo+bar")),
        "http://xn--n3h.example.com/foo+bar/"
    );
    assert_eq!(matched(adapter.match_path("/foo+bar/")).0, "foobar");

    assert_eq!(
        adapter.build_with("enter", &Params::new(), true, true).unwrap(),
        "http://xn--n3h.example.com/%D0%B2%D0%BE%D0%B9%D1%82%D0%B8/"
    );
    assert_eq!(
        adapter.build_with("foobar", &Params::new(), true, true).unwrap(),
        "http://xn--n3h.example.com/foo+bar/"
    );
}

#[test]
fn test_redirect_to() {
    let map = map(vec![
        route("/old/<int:id>", "old")
            .with_redirect_to(RedirectTarget::Template("new/<id>".to_string())),
        route("/legacy/<int:id>", "legacy").with_redirect_to(RedirectTarget::Callback(
            Arc::new(|_: &MapAdapter<'_>, values: &Params| format!("items/{}", values["id"])),
        )),
        route("/new/<int:id>", "new"),
    ]);
    let adapter = map.bind("example.com", None).unwrap();

    assert_eq!(redirect(adapter.match_path("/old/5")), "http://example.com/new/5");
    assert_eq!(redirect(adapter.match_path("/legacy/7")), "http://example.com/items/7");
    assert!(adapter.test("/old/5"));
    assert!(!adapter.test("/missing"));
}

#[test]
fn test_build_only_route_never_matches() {
    let map = map(vec![
        route("/static/<path:file>", "static").with_build_only(true),
    ]);
    let adapter = map.bind("example.com", None).unwrap();

    assert_eq!(adapter.match_path("/static/app.css").unwrap_err(), MatchError::NotFound);
    assert_eq!(
        adapter.build("static", &params([("file", "app.css")])).unwrap(),
        "/static/app.css"
    );
}

#[test]
fn test_endpoint_expecting() {
    let map = map(vec![
        route("/foo/", "foo").with_defaults(params([("page", 1)])),
        route("/foo/<int:page>/<slug>", "foo"),
    ]);

    assert!(map.is_endpoint_expecting("foo", &["page"]));
    assert!(map.is_endpoint_expecting("foo", &["page", "slug"]));
    assert!(!map.is_endpoint_expecting("foo", &["id"]));
    assert!(!map.is_endpoint_expecting("bar", &[]));
}

#[test]
fn test_map_debug() {
    let map = map(vec![route("/wat", "enter"), route("/woop", "foobar")]);

    assert_eq!(
        format!("{map:?}"),
        "UrlMap([<Route '/woop' -> foobar>, <Route '/wat' -> enter>])"
    );
}

#[test]
fn test_subdomain_route_unreachable_from_default_subdomain() {
    let map = map(vec![Route::new("/").with_endpoint("admin").with_subdomain("admin")]);
    let adapter = map.bind("example.com", None).unwrap();

    assert_eq!(adapter.match_path("/").unwrap_err(), MatchError::NotFound);
    assert_eq!(
        adapter.build("admin", &Params::new()).unwrap(),
        "http://admin.example.com/"
    );
}
