use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::engine::{AnnotationPropertySpec, ClassSpec, DataPropertySpec, ObjectPropertySpec};
use crate::error::OntographError;
use crate::individual::IndividualSpec;
use crate::interface::OntologyInterface;
use crate::relationship::RelationshipRequest;

type Shared = State<Arc<OntologyInterface>>;

#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.into(),
            data: Some(data),
        })
    }
}

#[derive(Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub filename: Option<String>,
}

pub struct ApiError(OntographError);

impl From<OntographError> for ApiError {
    fn from(e: OntographError) -> Self {
        Self(e)
    }
}

pub fn status_for(error: &OntographError) -> StatusCode {
    if error.is_internal() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else if error.is_resolution() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body: Envelope<()> = Envelope {
            status: "error",
            message: self.0.to_string(),
            data: None,
        };
        warn!(code = status.as_u16(), message = %body.message, "request rejected");
        (status, Json(body)).into_response()
    }
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|e| ApiError(OntographError::InvalidRequest(e.body_text())))
}

// Graph operations are synchronous and take the graph lock, so they run on a blocking thread.
async fn blocking<T, F>(interface: Arc<OntologyInterface>, operation: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&OntologyInterface) -> crate::error::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || operation(&interface))
        .await
        .map_err(|e| {
            warn!(error = %e, "join error");
            ApiError(OntographError::Lock(e.to_string()))
        })?
        .map_err(ApiError)
}

pub fn router(interface: Arc<OntologyInterface>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);
    Router::new()
        .route("/load-ontology/", post(load_ontology))
        .route("/create-class/", post(create_class))
        .route("/export-ontology/", get(export_ontology))
        .route("/create-individual/", post(create_individual))
        .route("/relationship-manager/", post(manage_relationship))
        .route("/api/object-properties/", get(list_object_properties))
        .route("/api/data-properties/", get(list_data_properties))
        .route("/api/classes/", get(list_classes))
        .route("/create_object_property/", post(create_object_property))
        .route("/create_data_property/", post(create_data_property))
        .route("/create_annotation_property/", post(create_annotation_property))
        .layer(cors)
        .with_state(interface)
}

async fn load_ontology(State(iface): Shared, body: Bytes) -> Result<Response, ApiError> {
    if body.is_empty() {
        return Err(OntographError::InvalidRequest("no ontology document uploaded".into()).into());
    }
    let snapshot = blocking(iface, move |i| i.load_graph(&body)).await?;
    info!(classes = snapshot.classes_count, "ontology loaded over http");
    Ok(Envelope::ok("Ontology loaded successfully", snapshot).into_response())
}

async fn create_class(
    State(iface): Shared,
    body: Result<Json<ClassSpec>, JsonRejection>,
) -> Result<Response, ApiError> {
    let spec = payload(body)?;
    let tree = blocking(iface, move |i| i.create_class(spec)).await?;
    Ok(Envelope::ok("Class created successfully", tree).into_response())
}

async fn export_ontology(
    State(iface): Shared,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let requested = query.filename.unwrap_or_default();
    let export = blocking(iface, move |i| i.export_graph(&requested)).await?;
    let headers = [
        (header::CONTENT_TYPE, "application/rdf+xml".to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    Ok((headers, export.bytes).into_response())
}

async fn create_individual(
    State(iface): Shared,
    body: Result<Json<IndividualSpec>, JsonRejection>,
) -> Result<Response, ApiError> {
    let spec = payload(body)?;
    let individuals = blocking(iface, move |i| i.create_individual(spec)).await?;
    Ok(Envelope::ok("Individual created successfully", individuals).into_response())
}

async fn manage_relationship(
    State(iface): Shared,
    body: Result<Json<RelationshipRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = payload(body)?;
    let message = format!("Relationship {} completed", request.action.to_lowercase());
    let individuals = blocking(iface, move |i| i.manage_relationship(request)).await?;
    Ok(Envelope::ok(message, individuals).into_response())
}

async fn list_object_properties(State(iface): Shared) -> Result<Response, ApiError> {
    let properties = blocking(iface, |i| i.list_object_properties()).await?;
    Ok(Envelope::ok("Object properties", properties).into_response())
}

async fn list_data_properties(State(iface): Shared) -> Result<Response, ApiError> {
    let properties = blocking(iface, |i| i.list_data_properties()).await?;
    Ok(Envelope::ok("Data properties", properties).into_response())
}

async fn list_classes(State(iface): Shared) -> Result<Response, ApiError> {
    let classes = blocking(iface, |i| i.list_classes()).await?;
    Ok(Envelope::ok("Classes", classes).into_response())
}

async fn create_object_property(
    State(iface): Shared,
    body: Result<Json<ObjectPropertySpec>, JsonRejection>,
) -> Result<Response, ApiError> {
    let spec = payload(body)?;
    let properties = blocking(iface, move |i| i.create_object_property(spec)).await?;
    Ok(Envelope::ok("Object property created successfully", properties).into_response())
}

async fn create_data_property(
    State(iface): Shared,
    body: Result<Json<DataPropertySpec>, JsonRejection>,
) -> Result<Response, ApiError> {
    let spec = payload(body)?;
    let iri = blocking(iface, move |i| i.create_data_property(spec)).await?;
    Ok(Envelope::ok("Data property created successfully", iri).into_response())
}

async fn create_annotation_property(
    State(iface): Shared,
    body: Result<Json<AnnotationPropertySpec>, JsonRejection>,
) -> Result<Response, ApiError> {
    let spec = payload(body)?;
    let properties = blocking(iface, move |i| i.create_annotation_property(spec)).await?;
    Ok(Envelope::ok("Annotation property created successfully", properties).into_response())
}
