use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    entities::category,
    models::{MovieWithCategory, Page},
    validation::{ALLOWED_EXTENSIONS, MAX_COVER_KB, MovieForm, ValidationErrors},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";

pub fn index_page(movies: &Page<MovieWithCategory>, search: Option<&str>, flash: Option<&str>) -> String {
    page(
        "Movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-5xl mx-auto px-6 py-10" {
                    div class="flex items-start justify-between gap-6" {
                        h1 class="text-3xl font-bold text-gray-900" { "Movies" }
                        div class="flex gap-4 text-sm" {
                            a class="text-blue-600 hover:text-blue-800" href="/movies/create" { "Add movie" }
                            a class="text-blue-600 hover:text-blue-800" href="/movies/data" { "Manage" }
                        }
                    }

                    (flash_banner(flash))

                    form class="mt-6 flex gap-2" method="get" action="/movies" {
                        input class=(INPUT_CLASS) type="search" name="search" placeholder="Search title or synopsis" value=(search.unwrap_or_default());
                        button class="mt-2 rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Search" }
                    }

                    @if movies.items.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No movies found." }
                        }
                    } @else {
                        div class="mt-8 grid gap-6 sm:grid-cols-2 md:grid-cols-3" {
                            @for item in &movies.items {
                                (movie_card(item))
                            }
                        }
                    }

                    (pagination("/movies", search, movies))
                }
            }
        },
    )
}

pub fn detail_page(item: &MovieWithCategory) -> String {
    let movie = &item.movie;
    page(
        &movie.judul,
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-3xl mx-auto px-6 py-10" {
                    a class="text-sm text-blue-600 hover:text-blue-800" href="/movies" { "Back to movies" }
                    div class="mt-6 bg-white shadow rounded-lg p-8 md:flex gap-8" {
                        @if movie.has_cover() {
                            img class="w-48 rounded-md object-cover" src=(image_url(&movie.foto_sampul)) alt=(movie.judul);
                        }
                        div {
                            h1 class="text-3xl font-bold text-gray-900" {
                                (movie.judul)
                                span class="ml-2 font-normal text-gray-500" { "(" (movie.tahun) ")" }
                            }
                            p class="mt-2 text-sm text-gray-500" { (item.category_name()) }
                            h2 class="mt-6 text-sm font-semibold text-gray-700" { "Synopsis" }
                            p class="mt-2 text-gray-700 whitespace-pre-line" { (movie.sinopsis) }
                            h2 class="mt-6 text-sm font-semibold text-gray-700" { "Cast" }
                            p class="mt-2 text-gray-700" { (movie.pemain) }
                        }
                    }
                }
            }
        },
    )
}

pub fn admin_page(movies: &Page<MovieWithCategory>, flash: Option<&str>) -> String {
    page(
        "Manage movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-5xl mx-auto px-6 py-10" {
                    div class="flex items-start justify-between gap-6" {
                        h1 class="text-3xl font-bold text-gray-900" { "Manage movies" }
                        div class="flex gap-4 text-sm" {
                            a class="text-blue-600 hover:text-blue-800" href="/movies/create" { "Add movie" }
                            a class="text-blue-600 hover:text-blue-800" href="/movies" { "Public listing" }
                        }
                    }

                    (flash_banner(flash))

                    div class="mt-8 bg-white shadow rounded-lg overflow-hidden" {
                        table class="min-w-full divide-y divide-gray-200 text-sm" {
                            thead class="bg-gray-50 text-left text-gray-700" {
                                tr {
                                    th class="px-4 py-3" { "#" }
                                    th class="px-4 py-3" { "Cover" }
                                    th class="px-4 py-3" { "Title" }
                                    th class="px-4 py-3" { "Category" }
                                    th class="px-4 py-3" { "Year" }
                                    th class="px-4 py-3" { "Actions" }
                                }
                            }
                            tbody class="divide-y divide-gray-100" {
                                @for (offset, item) in movies.items.iter().enumerate() {
                                    (admin_row(movies.first_index().saturating_add(offset as u64), item))
                                }
                                @if movies.items.is_empty() {
                                    tr { td class="px-4 py-6 text-gray-500" colspan="6" { "No movies yet." } }
                                }
                            }
                        }
                    }

                    (pagination("/movies/data", None, movies))
                }
            }
        },
    )
}

pub struct MovieFormView<'a> {
    pub heading: &'a str,
    pub action: String,
    pub form: &'a MovieForm,
    pub categories: &'a [category::Model],
    pub errors: &'a ValidationErrors,
    pub current_cover: Option<&'a str>,
}

pub fn form_page(view: &MovieFormView<'_>) -> String {
    let form = view.form;
    let chosen = form.category_id();

    page(
        view.heading,
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-2xl mx-auto px-6 py-12" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-3xl font-bold text-gray-900" { (view.heading) }

                        @if !view.errors.is_empty() {
                            div class="mt-6 rounded-md border border-red-200 bg-red-50 p-4 text-sm text-red-700" {
                                "Please correct the highlighted fields."
                            }
                        }

                        form class="mt-8 space-y-6" method="post" action=(view.action) enctype="multipart/form-data" {
                            div {
                                label class="block text-sm font-medium text-gray-700" for="judul" { "Title" }
                                input class=(INPUT_CLASS) name="judul" id="judul" maxlength="255" value=(form.judul) required;
                                (field_errors(view.errors, "judul"))
                            }

                            div {
                                label class="block text-sm font-medium text-gray-700" for="category_id" { "Category" }
                                select class=(INPUT_CLASS) name="category_id" id="category_id" required {
                                    option value="" { "Choose a category" }
                                    @for cat in view.categories {
                                        option value=(cat.id) selected[chosen == Some(cat.id)] { (cat.name) }
                                    }
                                }
                                (field_errors(view.errors, "category_id"))
                            }

                            div {
                                label class="block text-sm font-medium text-gray-700" for="sinopsis" { "Synopsis" }
                                textarea class=(INPUT_CLASS) name="sinopsis" id="sinopsis" rows="5" required { (form.sinopsis) }
                                (field_errors(view.errors, "sinopsis"))
                            }

                            div {
                                label class="block text-sm font-medium text-gray-700" for="tahun" { "Year" }
                                input class=(INPUT_CLASS) type="number" name="tahun" id="tahun" value=(form.tahun) required;
                                (field_errors(view.errors, "tahun"))
                            }

                            div {
                                label class="block text-sm font-medium text-gray-700" for="pemain" { "Cast" }
                                input class=(INPUT_CLASS) name="pemain" id="pemain" value=(form.pemain) required;
                                (field_errors(view.errors, "pemain"))
                            }

                            div {
                                label class="block text-sm font-medium text-gray-700" for="foto_sampul" { "Cover image" }
                                @if let Some(cover) = view.current_cover {
                                    img class="mt-2 w-32 rounded-md" src=(image_url(cover)) alt="Current cover";
                                }
                                input class="mt-2 w-full text-sm" type="file" name="foto_sampul" id="foto_sampul" accept="image/*";
                                p class="mt-2 text-xs text-gray-500" {
                                    (ALLOWED_EXTENSIONS.join(", ")) ", up to " (MAX_COVER_KB) " KB."
                                    @if view.current_cover.is_some() { " Leave empty to keep the current cover." }
                                }
                                (field_errors(view.errors, "foto_sampul"))
                            }

                            button class="w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Save" }
                        }
                    }
                }
            }
        },
    )
}

pub fn error_page(status: StatusCode, message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { (status.as_u16()) " " (status.canonical_reason().unwrap_or("Error")) }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/movies" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn flash_banner(flash: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = flash {
            div class="mt-6 rounded-md border border-green-200 bg-green-50 p-4 text-sm text-green-800" role="status" {
                (message)
            }
        }
    }
}

fn field_errors(errors: &ValidationErrors, field: &str) -> Markup {
    html! {
        @for message in errors.get(field) {
            p class="mt-2 text-sm text-red-600" { (message) }
        }
    }
}

fn movie_card(item: &MovieWithCategory) -> Markup {
    let movie = &item.movie;
    html! {
        a class="block bg-white shadow rounded-lg overflow-hidden hover:shadow-md" href=(format!("/movies/{}", movie.id)) {
            @if movie.has_cover() {
                img class="h-64 w-full object-cover" src=(image_url(&movie.foto_sampul)) alt=(movie.judul);
            } @else {
                div class="h-64 w-full bg-gray-200" {}
            }
            div class="p-4" {
                h2 class="text-lg font-semibold text-gray-900" {
                    (movie.judul)
                    span class="ml-2 font-normal text-gray-500" { "(" (movie.tahun) ")" }
                }
                p class="mt-1 text-sm text-gray-500" { (item.category_name()) }
            }
        }
    }
}

fn admin_row(number: u64, item: &MovieWithCategory) -> Markup {
    let movie = &item.movie;
    html! {
        tr {
            td class="px-4 py-3 text-gray-500" { (number) }
            td class="px-4 py-3" {
                @if movie.has_cover() {
                    img class="h-16 w-12 rounded object-cover" src=(image_url(&movie.foto_sampul)) alt=(movie.judul);
                }
            }
            td class="px-4 py-3 font-medium text-gray-900" {
                a class="hover:text-blue-700" href=(format!("/movies/{}", movie.id)) { (movie.judul) }
            }
            td class="px-4 py-3 text-gray-700" { (item.category_name()) }
            td class="px-4 py-3 text-gray-700" { (movie.tahun) }
            td class="px-4 py-3" {
                div class="flex gap-3" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/movies/{}/edit", movie.id)) { "Edit" }
                    form method="post" action=(format!("/movies/{}/delete", movie.id)) onsubmit="return confirm('Delete this movie?')" {
                        button class="text-red-600 hover:text-red-800" type="submit" { "Delete" }
                    }
                }
            }
        }
    }
}

fn pagination<T>(base: &str, search: Option<&str>, movies: &Page<T>) -> Markup {
    html! {
        @if movies.last_page > 1 {
            nav class="mt-8 flex items-center justify-between text-sm" {
                @if movies.has_previous() {
                    a class="text-blue-600 hover:text-blue-800" href=(page_url(base, search, movies.page - 1)) { "Previous" }
                } @else {
                    span class="text-gray-400" { "Previous" }
                }
                span class="text-gray-600" { "Page " (movies.page) " of " (movies.last_page) }
                @if movies.has_next() {
                    a class="text-blue-600 hover:text-blue-800" href=(page_url(base, search, movies.page + 1)) { "Next" }
                } @else {
                    span class="text-gray-400" { "Next" }
                }
            }
        }
    }
}

pub fn page_url(base: &str, search: Option<&str>, page: u64) -> String {
    match search {
        Some(term) => format!("{base}?search={}&page={page}", urlencoding::encode(term)),
        None => format!("{base}?page={page}"),
    }
}

fn image_url(name: &str) -> String {
    format!("/images/{}", urlencoding::encode(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_links_keep_the_search_term() {
        assert_eq!(page_url("/movies", Some("star wars"), 2), "/movies?search=star%20wars&page=2");
        assert_eq!(page_url("/movies/data", None, 3), "/movies/data?page=3");
    }

    #[test]
    fn form_marks_the_selected_category_and_shows_errors() {
        let categories = vec![
            category::Model { id: 1, name: "Action".to_string() },
            category::Model { id: 2, name: "Drama".to_string() },
        ];
        let form = MovieForm { category_id: "2".to_string(), ..MovieForm::default() };
        let mut errors = ValidationErrors::default();
        errors.add("judul", "The judul field is required.");

        let html = form_page(&MovieFormView {
            heading: "Add movie",
            action: "/movies".to_string(),
            form: &form,
            categories: &categories,
            errors: &errors,
            current_cover: None,
        });

        assert!(html.contains(r#"<option value="2" selected>Drama</option>"#));
        assert!(html.contains("The judul field is required."));
    }
}
