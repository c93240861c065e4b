use apigw_core::routes::{gateway_paths, routes_by_tag};
use apigw_core::{generate, AppManifest, GenerationConfig, ParameterNameMap, ResourceTree};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const ITEMS_MANIFEST: &str = r#"
title: Items
routes:
  - type: http
    path: /items/{item_id}
    methods: [GET]
    name: get_item
    response: {kind: model, name: Parent}
    tags: [items]
models:
  - name: Parent
    properties:
      child: {schema: {kind: model, name: Child}}
    required: [child]
  - name: Child
    properties:
      name: {schema: {kind: primitive, type: string}}
    required: [name]
"#;

const TODO_MANIFEST: &str = r#"
title: Todo API
routes:
  - type: http
    path: /api/v1/todos
    methods: [GET]
    name: list_todos
    response: {kind: model, name: TodoListResponse}
    tags: [todos]
  - type: http
    path: /api/v1/todos
    methods: [POST]
    name: create_todo
    request: {kind: model, name: TodoCreate}
    response: {kind: model, name: TodoResponse}
    tags: [todos]
  - type: http
    path: /api/v1/todos/{todo_id}
    methods: [GET, PUT, DELETE, OPTIONS]
    name: todo_item
    response: {kind: optional, inner: {kind: model, name: TodoResponse}}
    tags: [todos]
  - type: http
    path: /api/v1/todos/{other_id}/toggle
    methods: [patch]
    name: toggle_todo
    response: {kind: model, name: TodoResponse}
    tags: [todos]
  - type: http
    path: /api/v1/todos/{todo_id}/comments/{comment_id}
    methods: [GET]
    name: get_comment
    tags: [comments]
  - type: mount
    path: /docs
  - type: http
    path: /health
    methods: []
    name: health
models:
  - name: TodoCreate
    properties:
      title:
        schema: {kind: primitive, type: string}
        min_length: 1
        max_length: 200
        description: Title of the todo item
      priority:
        schema: {kind: enum, name: Priority, values: [low, medium, high, urgent]}
        default: medium
      tags:
        schema: {kind: array, items: {kind: primitive, type: string}}
        max_items: 10
    required: [title]
  - name: TodoResponse
    properties:
      id: {schema: {kind: primitive, type: string, format: uuid}}
      title: {schema: {kind: primitive, type: string}}
    required: [id, title]
  - name: TodoListResponse
    properties:
      items: {schema: {kind: array, items: {kind: model, name: TodoResponse}}}
      total: {schema: {kind: primitive, type: integer}, minimum: 0}
    required: [items, total]
"#;

fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("$ref") || map.values().any(contains_ref),
        Value::Array(items) => items.iter().any(contains_ref),
        _ => false,
    }
}

#[test]
fn test_items_scenario_end_to_end() {
    let manifest = AppManifest::from_yaml(ITEMS_MANIFEST).unwrap();
    let generation = generate(&manifest, &GenerationConfig::default()).unwrap();

    assert_eq!(generation.routes.len(), 1);
    assert_eq!(generation.routes[0].path, "/items/{item_id}");

    let groups = routes_by_tag(&generation.routes);
    assert_eq!(groups["items"][0].path, "/items/{item_id}");
    assert_eq!(gateway_paths(&generation.routes), vec!["/items/{item_id}"]);

    assert_eq!(
        generation.registry.names().collect::<Vec<_>>(),
        vec!["Parent", "Child"]
    );

    let parent = &generation.schemas["Parent"];
    assert!(parent.get("$defs").is_none());
    assert!(!contains_ref(parent));
    assert_eq!(
        parent["properties"]["child"],
        json!({
            "title": "Child",
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"]
        })
    );
    assert!(generation.anomalies.is_empty());
}

#[test]
fn test_todo_scenario_parameter_map() {
    let paths = [
        "/api/v1/todos/{todo_id}",
        "/api/v1/todos/{other_id}/toggle",
        "/api/v1/todos/{todo_id}/comments/{comment_id}",
    ];
    let names = ParameterNameMap::build(paths);
    assert_eq!(
        names.iter().collect::<Vec<_>>(),
        vec![
            ("/api/v1/todos", "{todo_id}"),
            ("/api/v1/todos/{todo_id}/comments", "{comment_id}"),
        ]
    );

    let mut tree = ResourceTree::new();
    let item = tree.resolve(paths[0], &names);
    let toggle = tree.resolve(paths[1], &names);
    let toggle_parent = tree.node(toggle).unwrap().parent.unwrap();
    assert_eq!(item, toggle_parent);
    assert_eq!(tree.full_path(toggle), "/api/v1/todos/{todo_id}/toggle");
}

#[test]
fn test_todo_manifest_generation() {
    let manifest = AppManifest::from_yaml(TODO_MANIFEST).unwrap();
    let generation = generate(&manifest, &GenerationConfig::default()).unwrap();

    // The health route has no methods; the mount is ignored.
    assert_eq!(generation.routes.len(), 5);
    assert_eq!(
        generation
            .warnings()
            .map(|a| a.to_string())
            .collect::<Vec<_>>(),
        vec!["skipped route #6 'health': no HTTP methods declared"]
    );
    assert_eq!(
        generation
            .anomalies
            .iter()
            .filter(|a| !a.is_warning())
            .map(|a| a.to_string())
            .collect::<Vec<_>>(),
        vec!["parameter {other_id} under '/api/v1/todos' renamed to {todo_id}"]
    );

    // Priority is an enum definition, not a collected model.
    assert_eq!(
        generation.registry.names().collect::<Vec<_>>(),
        vec!["TodoListResponse", "TodoResponse", "TodoCreate"]
    );
    let create = &generation.schemas["TodoCreate"];
    assert_eq!(create["properties"]["priority"]["enum"], json!(["low", "medium", "high", "urgent"]));
    assert_eq!(create["properties"]["title"]["maxLength"], 200);
    let list = &generation.schemas["TodoListResponse"];
    assert_eq!(list["properties"]["items"]["items"]["properties"]["id"]["format"], "uuid");
    assert!(generation.schemas.values().all(|s| !contains_ref(s)));

    // One node per distinct normalized segment.
    assert_eq!(
        generation.tree.created().keys().collect::<Vec<_>>(),
        vec![
            "/",
            "/api",
            "/api/v1",
            "/api/v1/todos",
            "/api/v1/todos/{todo_id}",
            "/api/v1/todos/{todo_id}/toggle",
            "/api/v1/todos/{todo_id}/comments",
            "/api/v1/todos/{todo_id}/comments/{comment_id}",
        ]
    );

    let bound: Vec<_> = generation
        .bindings
        .iter()
        .map(|b| format!("{} {}", b.method, b.resource_path))
        .collect();
    assert_eq!(
        bound,
        vec![
            "GET /api/v1/todos",
            "POST /api/v1/todos",
            "DELETE /api/v1/todos/{todo_id}",
            "GET /api/v1/todos/{todo_id}",
            "PUT /api/v1/todos/{todo_id}",
            "PATCH /api/v1/todos/{todo_id}/toggle",
            "GET /api/v1/todos/{todo_id}/comments/{comment_id}",
        ]
    );
    assert_eq!(generation.bindings[1].request_schema.as_deref(), Some("TodoCreate"));
    assert_eq!(generation.bindings[2].response_schema.as_deref(), Some("TodoResponse"));
}

#[test]
fn test_document_shape() {
    let manifest = AppManifest::from_yaml(ITEMS_MANIFEST).unwrap();
    let generation = generate(&manifest, &GenerationConfig::default()).unwrap();
    let document = generation.to_document();

    assert_eq!(document["title"], "Items");
    assert_eq!(document["routes"][0]["response_model"], "Parent");
    assert_eq!(document["resources"]["created"]["/items/{item_id}"], 2);
    assert_eq!(document["parameters"]["canonical"]["/items"], "{item_id}");
    assert_eq!(
        document["gateway_models"]["Parent"]["$schema"],
        "http://json-schema.org/draft-04/schema#"
    );
    assert_eq!(document["bindings"][0]["method"], "GET");
    assert_eq!(document["anomalies"], json!([]));
}

#[test]
fn test_runs_are_independent() {
    let manifest = AppManifest::from_yaml(TODO_MANIFEST).unwrap();
    let first = generate(&manifest, &GenerationConfig::default()).unwrap();
    let second = generate(&manifest, &GenerationConfig::default()).unwrap();
    assert_eq!(first.tree, second.tree);
    assert_eq!(first.parameter_names, second.parameter_names);
    assert_eq!(first.to_document(), second.to_document());
}

#[test]
fn test_malformed_items_degrade_without_aborting() {
    let yaml = r#"
routes:
  - {type: http, path: /todos, methods: [GET], name: list_todos, response: {kind: model, name: Event}}
  - {type: static, path: /assets}
  - {type: http, path: /broken, methods: 5, name: broken}
  - {type: http, path: /other, methods: [GET], name: other, response: {kind: model, name: Other}}
models:
  - name: Event
    properties:
      when: {schema: {kind: datetime}}
  - name: Other
    properties:
      id: {schema: {kind: primitive, type: integer}}
"#;
    let manifest = AppManifest::from_yaml(yaml).unwrap();
    let generation = generate(&manifest, &GenerationConfig::default()).unwrap();

    assert_eq!(
        generation.routes.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        vec!["list_todos", "other"]
    );
    assert_eq!(
        generation.registry.names().collect::<Vec<_>>(),
        vec!["Other"]
    );
    assert_eq!(generation.schemas["Other"]["properties"]["id"]["type"], "integer");
    assert_eq!(generation.bindings.len(), 2);

    let kinds: Vec<_> = generation
        .to_document()["anomalies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec!["skipped_route", "malformed_model", "missing_model"]
    );
    let warnings: Vec<_> = generation.warnings().map(|a| a.to_string()).collect();
    assert!(warnings[0].starts_with("skipped route #2 'broken': malformed entry"));
    assert!(warnings[1].starts_with("skipped model #0 'Event'"));
    assert_eq!(warnings[2], "model 'Event' used by 'list_todos' is not declared");
}

#[test]
fn test_enum_and_model_with_one_name_flatten_separately() {
    let yaml = r#"
routes:
  - {type: http, path: /a, methods: [GET], name: get_a, response: {kind: model, name: A}}
models:
  - name: A
    properties:
      status: {schema: {kind: enum, name: Status, values: [x, y]}}
      detail: {schema: {kind: model, name: Status}}
  - name: Status
    properties:
      code: {schema: {kind: primitive, type: integer}}
"#;
    let manifest = AppManifest::from_yaml(yaml).unwrap();
    let generation = generate(&manifest, &GenerationConfig::default()).unwrap();

    let a = &generation.schemas["A"];
    assert_eq!(a["properties"]["status"]["enum"], json!(["x", "y"]));
    assert_eq!(a["properties"]["detail"]["title"], "Status");
    assert_eq!(a["properties"]["detail"]["properties"]["code"]["type"], "integer");
    assert!(generation.anomalies.is_empty());
}
