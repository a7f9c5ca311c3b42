use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::{
    AppState,
    error::{AppError, AppResult, CatalogError},
    models::ListQuery,
    templates::{self, MovieFormView},
    validation::{MovieForm, Upload, ValidationErrors},
};

const FLASH_COOKIE: &str = "flash";

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let filter = q.filter();
    let movies = state.catalog.list(&filter, q.page(), state.config.public_page_size).await?;

    let (jar, flash) = take_flash(jar);
    Ok((jar, Html(templates::index_page(&movies, filter.search.as_deref(), flash.as_deref()))))
}

pub async fn data(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let movies = state
        .catalog
        .list(&Default::default(), q.page(), state.config.admin_page_size)
        .await?;

    let (jar, flash) = take_flash(jar);
    Ok((jar, Html(templates::admin_page(&movies, flash.as_deref()))))
}

pub async fn detail(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> AppResult<Html<String>> {
    let movie = state.catalog.get(parse_id(&id)?).await?;
    Ok(Html(templates::detail_page(&movie)))
}

pub async fn create_form(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let categories = state.catalog.categories().await?;
    Ok(Html(templates::form_page(&MovieFormView {
        heading: "Add movie",
        action: "/movies".to_string(),
        form: &MovieForm::default(),
        categories: &categories,
        errors: &ValidationErrors::default(),
        current_cover: None,
    })))
}

pub async fn store(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<Response> {
    let (form, upload) = read_movie_form(multipart).await?;

    match state.catalog.create(&form, upload).await {
        Ok(_) => Ok((with_flash(jar, "Movie added successfully."), Redirect::to("/movies")).into_response()),
        Err(CatalogError::Validation(errors)) => {
            let categories = state.catalog.categories().await?;
            let body = templates::form_page(&MovieFormView {
                heading: "Add movie",
                action: "/movies".to_string(),
                form: &form,
                categories: &categories,
                errors: &errors,
                current_cover: None,
            });
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response())
        },
        Err(err) => Err(err.into()),
    }
}

pub async fn edit_form(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> AppResult<Html<String>> {
    let id = parse_id(&id)?;
    let movie = state.catalog.get(id).await?.movie;
    let categories = state.catalog.categories().await?;

    Ok(Html(templates::form_page(&MovieFormView {
        heading: "Edit movie",
        action: format!("/movies/{id}"),
        form: &MovieForm::from(&movie),
        categories: &categories,
        errors: &ValidationErrors::default(),
        current_cover: movie.has_cover().then_some(movie.foto_sampul.as_str()),
    })))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    let (form, upload) = read_movie_form(multipart).await?;

    match state.catalog.update(id, &form, upload).await {
        Ok(_) => {
            Ok((with_flash(jar, "Movie updated successfully."), Redirect::to("/movies/data")).into_response())
        },
        Err(CatalogError::Validation(errors)) => {
            let movie = state.catalog.get(id).await?.movie;
            let categories = state.catalog.categories().await?;
            let body = templates::form_page(&MovieFormView {
                heading: "Edit movie",
                action: format!("/movies/{id}"),
                form: &form,
                categories: &categories,
                errors: &errors,
                current_cover: movie.has_cover().then_some(movie.foto_sampul.as_str()),
            });
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response())
        },
        Err(err) => Err(err.into()),
    }
}

pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    state.catalog.delete(parse_id(&id)?).await?;
    Ok((with_flash(jar, "Movie deleted successfully."), Redirect::to("/movies/data")))
}

/// Splits a `multipart/form-data` movie submission into its text fields and
/// the optional `foto_sampul` file. An empty file input counts as no upload.
async fn read_movie_form(mut multipart: Multipart) -> AppResult<(MovieForm, Option<Upload>)> {
    let mut form = MovieForm::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "foto_sampul" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !file_name.is_empty() || !bytes.is_empty() {
                    upload = Some(Upload { file_name, bytes });
                }
            },
            "judul" => form.judul = field.text().await?,
            "category_id" => form.category_id = field.text().await?,
            "sinopsis" => form.sinopsis = field.text().await?,
            "tahun" => form.tahun = field.text().await?,
            "pemain" => form.pemain = field.text().await?,
            _ => {},
        }
    }

    Ok((form, upload))
}

fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse().map_err(|_| AppError::NotFound(format!("movie {raw} not found")))
}

fn with_flash(jar: CookieJar, message: &str) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, urlencoding::encode(message).into_owned()))
            .path("/")
            .http_only(true)
            .max_age(time::Duration::minutes(5)),
    )
}

fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar
        .get(FLASH_COOKIE)
        .and_then(|c| urlencoding::decode(c.value()).ok().map(|m| m.into_owned()));

    match message {
        Some(message) => (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), Some(message)),
        None => (jar, None),
    }
}
