use crate::dates::LogicalDate;
use crate::errors::AppError;
use crate::models::{
    GroupView, NewUserRequest, TodayResponse, UpdateUserRequest, UserRecord, UserView,
    UsersResponse,
};
use crate::presenter::{Status, present, qualified_label};
use crate::refresh::{Registration, refresh_all, register, remove, update};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use std::collections::HashSet;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let outcome = refresh_all(&state.store, state.fetcher.as_ref(), state.today()).await?;
    let response = to_response(outcome.as_of, &outcome.users, &outcome.failed);
    Ok(Html(render_index(&response)))
}

pub async fn form_add(
    State(state): State<AppState>,
    Form(payload): Form<NewUserRequest>,
) -> Result<Redirect, AppError> {
    add(&state, &payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_edit(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Form(payload): Form<UpdateUserRequest>,
) -> Result<Redirect, AppError> {
    update(&state.store, &handle, payload.alias.as_deref(), payload.group.as_deref()).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_delete(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Redirect, AppError> {
    remove(&state.store, &handle).await?;
    Ok(Redirect::to("/"))
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    Json(TodayResponse {
        date: state.today().to_string(),
    })
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, AppError> {
    let users = state.store.session().await.load().await?;
    Ok(Json(to_response(state.today(), &users, &HashSet::new())))
}

pub async fn refresh(State(state): State<AppState>) -> Result<Json<UsersResponse>, AppError> {
    let outcome = refresh_all(&state.store, state.fetcher.as_ref(), state.today()).await?;
    Ok(Json(to_response(outcome.as_of, &outcome.users, &outcome.failed)))
}

pub async fn add_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    let response = match add(&state, &payload).await? {
        Registration::Added { record, fetch_failed } => {
            (StatusCode::CREATED, Json(to_view(&record, fetch_failed)))
        }
        Registration::Existing(record) => (StatusCode::OK, Json(to_view(&record, false))),
    };
    Ok(response)
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, AppError> {
    let alias = payload.alias.as_deref();
    let group = payload.group.as_deref();
    let record = update(&state.store, &handle, alias, group).await?;
    Ok(Json(to_view(&record, false)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<StatusCode, AppError> {
    remove(&state.store, &handle).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add(state: &AppState, payload: &NewUserRequest) -> Result<Registration, AppError> {
    register(
        &state.store,
        state.fetcher.as_ref(),
        state.today(),
        &payload.handle,
        &payload.alias,
        &payload.group,
    )
    .await
}

fn to_response(
    as_of: LogicalDate,
    users: &[UserRecord],
    failed: &HashSet<String>,
) -> UsersResponse {
    let groups = present(users)
        .into_iter()
        .map(|group| GroupView {
            users: group
                .members
                .iter()
                .map(|user| to_view(user, failed.contains(&user.handle)))
                .collect(),
            name: group.name,
        })
        .collect();

    UsersResponse {
        date: as_of.to_string(),
        groups,
    }
}

fn to_view(record: &UserRecord, fetch_failed: bool) -> UserView {
    let status = Status::of(record, fetch_failed);
    UserView {
        handle: record.handle.clone(),
        alias: record.alias.clone(),
        label: qualified_label(record),
        today_count: record.today_count,
        reverse_streak: record.reverse_streak,
        last_solved_date: record.last_solved_date,
        last_checked_date: record.last_checked_date,
        status: status.to_string(),
        tone: status.tone().to_string(),
    }
}
