use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::flights::SampleResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::flights::upload_flight,
        super::api::flights::list_flights,
        super::api::flights::get_flight,
        super::api::flights::list_samples,
        super::api::flights::get_track,
        super::api::flights::delete_flight,
    ),
    components(
        schemas(
            ErrorResponse,
            SampleResponse,
            crate::storage::FlightEntry,
            crate::importer::FlightSummary,
            crate::importer::LineString,
        )
    ),
    info(
        title = "Flight-O-Mat API",
        description = "Import drone flight logs and serve their summaries, samples and tracks",
        version = "0.1.0"
    ),
    tags(
        (name = "flights", description = "Flight import and retrieval")
    )
)]
pub struct ApiDoc;
