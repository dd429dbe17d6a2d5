use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::{
    attendance, auth, claims, health, inventory, notifications, orders, products, promotions,
    purchases, reports, shifts, sites, suppliers, users,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Bakery back office API"),
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::me,
        users::list_users,
        users::create_user,
        users::change_role,
        users::set_active,
        sites::list_sites,
        sites::create_site,
        sites::get_site,
        sites::update_site,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        suppliers::list_suppliers,
        suppliers::create_supplier,
        suppliers::get_supplier,
        suppliers::update_supplier,
        suppliers::delete_supplier,
        inventory::list_site_stock,
        inventory::set_stock,
        inventory::adjust_stock,
        inventory::transfer_stock,
        inventory::low_stock,
        purchases::list_purchases,
        purchases::create_purchase,
        purchases::get_purchase,
        purchases::receive_purchase,
        purchases::cancel_purchase,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::change_status,
        orders::cancel_order,
        promotions::list_promotions,
        promotions::create_promotion,
        promotions::get_promotion,
        promotions::validate_code,
        promotions::update_promotion,
        promotions::delete_promotion,
        shifts::list_shifts,
        shifts::create_shift,
        shifts::update_shift,
        shifts::delete_shift,
        attendance::check_in,
        attendance::check_out,
        attendance::list_attendance,
        attendance::summary,
        claims::list_claims,
        claims::open_claim,
        claims::get_claim,
        claims::change_claim_status,
        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::broadcast,
        reports::orders_report,
        reports::inventory_report,
        reports::attendance_report,
    ),
    modifiers(&BearerAuth),
    security(("bearer" = []))
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI at `/swagger-ui/`, document at `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi())
}
