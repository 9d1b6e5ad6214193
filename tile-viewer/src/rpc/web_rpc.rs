use crate::engine::bridge::handle::ViewerHandle;
use crate::engine::camera::viewport_camera::ViewportCamera;
use crate::tools::catalog::TilesetCatalog;
use crate::tools::downloads::platform_sink;
use crate::tools::viewpoints::{
    ReplayOverrides, ReplaySettings, ReplayStartError, ViewpointSession, begin_replay,
    notify_captured,
};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use view_capture::{CaptureError, ImportError, import_document};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication with the host page.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the host page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(e) = window
                .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("Failed to register message listener: {:?}", e);
            }
        }
        None => error!("Window object not available"),
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Viewer state an RPC handler may read or drive.
struct RpcContext<'a> {
    rpc: &'a mut WebRpcInterface,
    session: &'a mut ViewpointSession,
    viewport: &'a mut ViewportCamera,
    catalog: &'a mut TilesetCatalog,
    settings: &'a ReplaySettings,
    handle: &'a ViewerHandle,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut session: ResMut<ViewpointSession>,
    mut viewport: ResMut<ViewportCamera>,
    mut catalog: ResMut<TilesetCatalog>,
    settings: Res<ReplaySettings>,
    handle: Res<ViewerHandle>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Processing method: {}", request.method)
                    }),
                );

                let response = {
                    let mut context = RpcContext {
                        rpc: &mut rpc_interface,
                        session: &mut session,
                        viewport: &mut viewport,
                        catalog: &mut catalog,
                        settings: &settings,
                        handle: &handle,
                    };
                    handle_rpc_request(&request, &mut context)
                };
                if let Some(response) = response {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
fn handle_rpc_request(request: &RpcRequest, context: &mut RpcContext) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "load_tilesets" => handle_load_tilesets(&request.params, context),
        "capture_view" => handle_capture_view(context),
        "get_viewpoints" => handle_get_viewpoints(context),
        "export_viewpoints" => handle_export_viewpoints(context),
        "replay_viewpoints" => handle_replay_viewpoints(&request.params, context),
        "import_and_replay" => handle_import_and_replay(&request.params, context),
        "cancel_replay" => handle_cancel_replay(context),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                request.id.clone()?,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    // Notifications have no ID and get no response, even on error.
    let id = request.id.clone()?;

    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    })
}

fn handle_load_tilesets(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct LoadTilesetsParams {
        paths: Vec<String>,
    }

    let parsed = serde_json::from_value::<LoadTilesetsParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'paths' array of strings"))?;
    let count = parsed.paths.len();

    if !context.catalog.start(context.handle, parsed.paths) {
        return Err(
            RpcError::internal_error("A tileset catalog is already loading").with_kind("CatalogBusy")
        );
    }

    Ok(serde_json::json!({
        "accepted": true,
        "count": count
    }))
}

fn handle_capture_view(context: &mut RpcContext) -> Result<serde_json::Value, RpcError> {
    let (index, viewpoint) = context.session.capture().map_err(capture_error)?;
    notify_captured(context.rpc, index, &viewpoint);

    Ok(serde_json::json!({
        "index": index,
        "count": index + 1,
        "viewpoint": viewpoint
    }))
}

fn handle_get_viewpoints(context: &mut RpcContext) -> Result<serde_json::Value, RpcError> {
    serde_json::to_value(context.session.viewpoints())
        .map_err(|e| RpcError::internal_error(&e.to_string()))
}

fn handle_export_viewpoints(context: &mut RpcContext) -> Result<serde_json::Value, RpcError> {
    let mut sink = platform_sink(context.settings);
    let document = context
        .session
        .export(&mut sink)
        .map_err(|e| RpcError::internal_error(&e).with_kind("ExportFailure"))?;

    Ok(serde_json::json!({
        "file_name": document.file_name,
        "count": context.session.viewpoints().len(),
        "bytes": document.bytes.len()
    }))
}

fn handle_replay_viewpoints(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    let overrides = parse_overrides(params)?;
    let viewpoints = context.session.viewpoints().to_vec();
    start_replay(context, viewpoints, &overrides)
}

fn handle_import_and_replay(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct ImportParams {
        document: serde_json::Value,
        #[serde(flatten)]
        overrides: ReplayOverrides,
    }

    let parsed = serde_json::from_value::<ImportParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'document' parameter"))?;

    // Accept the file text as a string, or the array itself.
    let text = match parsed.document {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    };
    let viewpoints = import_document(&text).map_err(import_error)?;
    info!("Imported {} viewpoints over RPC", viewpoints.len());

    start_replay(context, viewpoints, &parsed.overrides)
}

fn handle_cancel_replay(context: &mut RpcContext) -> Result<serde_json::Value, RpcError> {
    Ok(serde_json::json!({
        "cancelled": context.session.cancel_replay()
    }))
}

fn parse_overrides(params: &serde_json::Value) -> Result<ReplayOverrides, RpcError> {
    if params.is_null() {
        return Ok(ReplayOverrides::default());
    }
    serde_json::from_value(params.clone())
        .map_err(|e| RpcError::invalid_params(&format!("Invalid replay options: {e}")))
}

fn start_replay(
    context: &mut RpcContext,
    viewpoints: Vec<view_capture::Viewpoint>,
    overrides: &ReplayOverrides,
) -> Result<serde_json::Value, RpcError> {
    let config = overrides
        .apply(context.settings.config)
        .map_err(|e| RpcError::invalid_params(&e))?;

    let count = begin_replay(
        context.session,
        context.viewport,
        context.rpc,
        viewpoints,
        config,
        platform_sink(context.settings),
    )
    .map_err(replay_start_error)?;

    Ok(serde_json::json!({
        "started": true,
        "count": count
    }))
}

fn capture_error(error: CaptureError) -> RpcError {
    let kind = match error {
        CaptureError::NoActiveRenderer => "NoActiveRenderer",
        CaptureError::InvalidCameraState => "InvalidCameraState",
    };
    RpcError::internal_error(&error.to_string()).with_kind(kind)
}

fn import_error(error: ImportError) -> RpcError {
    RpcError::invalid_params(&error.to_string()).with_kind("ParseFailure")
}

fn replay_start_error(error: ReplayStartError) -> RpcError {
    let kind = match error {
        ReplayStartError::Busy => "ReplayBusy",
        ReplayStartError::NoActiveRenderer => "NoActiveRenderer",
    };
    RpcError::internal_error(&error.to_string()).with_kind(kind)
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }

    /// Tag the error with a machine-readable `data.kind`.
    pub fn with_kind(mut self, kind: &str) -> Self {
        self.data = Some(serde_json::json!({ "kind": kind }));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bridge::handle::viewer_channel;

    struct Fixture {
        rpc: WebRpcInterface,
        session: ViewpointSession,
        viewport: ViewportCamera,
        catalog: TilesetCatalog,
        settings: ReplaySettings,
        handle: ViewerHandle,
    }

    impl Fixture {
        fn new() -> Self {
            let (handle, _, _) = viewer_channel();
            Self {
                rpc: WebRpcInterface::default(),
                session: ViewpointSession::default(),
                viewport: ViewportCamera::default(),
                catalog: TilesetCatalog::default(),
                settings: ReplaySettings::default(),
                handle,
            }
        }

        fn call(&mut self, method: &str, params: serde_json::Value) -> RpcResponse {
            let request = RpcRequest {
                jsonrpc: "2.0".into(),
                method: method.into(),
                params,
                id: Some(serde_json::json!(7)),
            };
            let mut context = RpcContext {
                rpc: &mut self.rpc,
                session: &mut self.session,
                viewport: &mut self.viewport,
                catalog: &mut self.catalog,
                settings: &self.settings,
                handle: &self.handle,
            };
            handle_rpc_request(&request, &mut context).unwrap()
        }
    }

    #[test]
    fn unknown_method_is_reported() {
        let response = Fixture::new().call("get_fps", serde_json::Value::Null);
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[test]
    fn capture_before_attach_is_internal_error_with_kind() {
        let mut fixture = Fixture::new();
        let error = fixture
            .call("capture_view", serde_json::Value::Null)
            .error
            .unwrap();

        assert_eq!(error.code, -32603);
        assert_eq!(error.data.unwrap()["kind"], "NoActiveRenderer");
        assert!(fixture.session.viewpoints().is_empty());
    }

    #[test]
    fn malformed_import_is_parse_failure() {
        let mut fixture = Fixture::new();
        let error = fixture
            .call(
                "import_and_replay",
                serde_json::json!({ "document": "[{\"position\": 1}" }),
            )
            .error
            .unwrap();

        assert_eq!(error.code, -32602);
        assert_eq!(error.data.unwrap()["kind"], "ParseFailure");
        assert!(!fixture.session.is_replaying());
    }

    #[test]
    fn replay_without_renderer_is_refused() {
        let mut fixture = Fixture::new();
        let error = fixture
            .call("replay_viewpoints", serde_json::json!({ "crop_size": 512 }))
            .error
            .unwrap();

        assert_eq!(error.data.unwrap()["kind"], "NoActiveRenderer");
        assert!(!fixture.viewport.suspended);
    }

    #[test]
    fn invalid_replay_options_are_invalid_params() {
        let mut fixture = Fixture::new();
        let error = fixture
            .call("replay_viewpoints", serde_json::json!({ "crop_size": "big" }))
            .error
            .unwrap();
        assert_eq!(error.code, -32602);
    }

    #[test]
    fn out_of_range_crop_is_invalid_params() {
        let mut fixture = Fixture::new();
        for crop_size in [0u32, 40_000] {
            let error = fixture
                .call(
                    "replay_viewpoints",
                    serde_json::json!({ "crop_size": crop_size }),
                )
                .error
                .unwrap();
            assert_eq!(error.code, -32602);
        }
        assert!(!fixture.session.is_replaying());
    }

    #[test]
    fn get_viewpoints_starts_empty() {
        let response = Fixture::new().call("get_viewpoints", serde_json::Value::Null);
        assert_eq!(response.result, Some(serde_json::json!([])));
    }

    #[test]
    fn cancel_without_replay_reports_false() {
        let response = Fixture::new().call("cancel_replay", serde_json::Value::Null);
        assert_eq!(response.result.unwrap()["cancelled"], false);
    }

    #[test]
    fn load_tilesets_requires_paths() {
        let response = Fixture::new().call("load_tilesets", serde_json::json!({ "path": "x" }));
        assert_eq!(response.error.unwrap().code, -32602);
    }
}
