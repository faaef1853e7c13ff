//! 路由表
//!
//! 受保护路由先经过认证中间件，再由各自声明的权限守卫放行。

use axum::{
    Router, middleware,
    routing::{MethodRouter, delete, get, patch, post},
};

use super::handlers::{auth, departments, permissions, roles, system, user_roles, users};
use super::middleware::{GuardState, authenticate, permission_guard, trace_context};
use super::state::AppState;

/// 为路由挂载权限守卫
fn guarded(
    state: &AppState,
    route: MethodRouter<AppState>,
    required: &'static [&'static str],
) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(
        GuardState {
            app: state.clone(),
            required,
        },
        permission_guard,
    ))
}

fn permission_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/permissions",
            guarded(state, post(permissions::create), &["permissions:create"])
                .merge(guarded(state, get(permissions::find), &["permissions:read"]))
                .merge(guarded(state, delete(permissions::delete), &["permissions:delete"])),
        )
        .route(
            "/permissions/search",
            guarded(state, get(permissions::search), &["permissions:read"]),
        )
        .route(
            "/permissions/{id}",
            guarded(state, patch(permissions::update), &["permissions:update"]),
        )
}

fn role_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/roles",
            guarded(state, post(roles::create), &["roles:create"])
                .merge(guarded(state, get(roles::find), &["roles:read"]))
                .merge(guarded(state, delete(roles::delete), &["roles:delete"])),
        )
        .route("/roles/search", guarded(state, get(roles::search), &["roles:read"]))
        .route("/roles/{id}", guarded(state, patch(roles::update), &["roles:update"]))
        .route(
            "/roles/{id}/permissions",
            guarded(state, post(roles::add_permissions), &["roles:update"]),
        )
}

fn department_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/departments",
            guarded(state, post(departments::create), &["departments:create"])
                .merge(guarded(state, get(departments::find), &["departments:read"]))
                .merge(guarded(state, delete(departments::delete), &["departments:delete"])),
        )
        .route(
            "/departments/search",
            guarded(state, get(departments::search), &["departments:read"]),
        )
        .route(
            "/departments/{id}",
            guarded(state, patch(departments::update), &["departments:update"]),
        )
}

fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            guarded(state, post(users::create), &["users:create"])
                .merge(guarded(state, delete(users::delete), &["users:delete"])),
        )
        .route("/users/search", guarded(state, get(users::search), &["users:read"]))
        .route(
            "/users/by-email/{email}",
            guarded(state, get(users::find_by_email), &["users:read"])
                .merge(guarded(state, patch(users::update_by_email), &["users:update"])),
        )
        .route(
            "/users/{id}",
            guarded(state, get(users::find_by_id), &["users:read"])
                .merge(guarded(state, patch(users::update_by_id), &["users:update"])),
        )
}

fn user_role_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/user-roles",
            guarded(state, post(user_roles::create), &["user_roles:create"])
                .merge(guarded(state, get(user_roles::find), &["user_roles:read"]))
                .merge(guarded(state, delete(user_roles::unassign), &["user_roles:delete"])),
        )
        .route(
            "/user-roles/by-email/{email}",
            guarded(state, get(user_roles::find_by_email), &["user_roles:read"]),
        )
        .route(
            "/user-roles/assign",
            guarded(state, post(user_roles::assign), &["user_roles:create"]),
        )
}

/// 构建完整路由
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .merge(permission_routes(&state))
        .merge(role_routes(&state))
        .merge(department_routes(&state))
        .merge(user_routes(&state))
        .merge(user_role_routes(&state))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .merge(protected)
        .layer(middleware::from_fn(trace_context))
        .with_state(state)
}
