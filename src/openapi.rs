//! OpenAPI document and Swagger UI wiring.

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{drivers, fleets, orders, shipments, status_updates};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Logistics API",
        description = "Fleet, driver, order, shipment and status-update management with admin approval gating",
        license(name = "MIT")
    ),
    paths(
        fleets::list_fleets,
        fleets::get_fleet,
        fleets::create_fleet,
        fleets::update_fleet,
        fleets::delete_fleet,
        drivers::list_drivers,
        drivers::get_driver,
        drivers::create_driver,
        drivers::update_driver,
        drivers::delete_driver,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
        shipments::list_shipments,
        shipments::get_shipment,
        shipments::create_shipment,
        shipments::auto_assign_shipment,
        shipments::available_vehicles,
        shipments::available_drivers,
        shipments::update_shipment,
        shipments::delete_shipment,
        status_updates::list_status_updates,
        status_updates::status_updates_for_order,
        status_updates::status_updates_for_shipment,
        status_updates::pending_approvals,
        status_updates::create_status_update,
        status_updates::approve_status_update,
        status_updates::request_cancellation,
    ),
    components(schemas(
        fleets::FleetResponse,
        fleets::CreateFleetRequest,
        fleets::UpdateFleetRequest,
        drivers::DriverResponse,
        drivers::CreateDriverRequest,
        drivers::UpdateDriverRequest,
        orders::OrderResponse,
        orders::CreateOrderRequest,
        orders::UpdateOrderRequest,
        shipments::ShipmentResponse,
        shipments::AssignmentResponse,
        shipments::CreateShipmentRequest,
        shipments::AutoAssignRequest,
        shipments::UpdateShipmentRequest,
        status_updates::StatusUpdateResponse,
        status_updates::CreateStatusUpdateRequest,
        status_updates::ApproveStatusUpdateRequest,
        status_updates::RequestCancellationRequest,
    )),
    tags(
        (name = "fleets", description = "Fleet vehicle management"),
        (name = "drivers", description = "Driver management"),
        (name = "orders", description = "Order management"),
        (name = "shipments", description = "Shipments and auto-assignment"),
        (name = "status-updates", description = "Status updates and the approval workflow"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/swagger-ui`, serving the document above.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
