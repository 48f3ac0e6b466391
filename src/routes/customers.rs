//! Customer, agent, and order routes.
//! `/customers/grade/:grade` is a static prefix, so it never competes with `/customers/:id`.

use crate::handlers::{
    create_customer, customers_by_grade, delete_customer, get_customer, list_agents, list_customers, list_orders,
    patch_customer, replace_customer,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn customer_routes(state: AppState) -> Router {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/grade/:grade", get(customers_by_grade))
        .route(
            "/customers/:id",
            get(get_customer)
                .put(replace_customer)
                .patch(patch_customer)
                .delete(delete_customer),
        )
        .route("/agents", get(list_agents))
        .route("/orders", get(list_orders))
        .with_state(state)
}
