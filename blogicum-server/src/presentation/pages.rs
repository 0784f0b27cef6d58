use actix_web::HttpResponse;

const ABOUT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head><meta charset="utf-8"><title>О проекте</title></head>
<body>
<h1>О проекте</h1>
<p>Блогикум — блог-платформа: посты по рубрикам и локациям,
комментарии и отложенные публикации.</p>
</body>
</html>
"#;

const RULES_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head><meta charset="utf-8"><title>Правила</title></head>
<body>
<h1>Наши правила</h1>
<p>Публикуйте свои тексты, уважайте чужие. Изменять и удалять посты
и комментарии может только их автор.</p>
</body>
</html>
"#;

const NOT_FOUND_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head><meta charset="utf-8"><title>404</title></head>
<body>
<h1>Страница не найдена</h1>
<p>Такой страницы нет, либо она скрыта.</p>
</body>
</html>
"#;

const SERVER_ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head><meta charset="utf-8"><title>500</title></head>
<body>
<h1>Что-то пошло не так</h1>
<p>Сервер не смог обработать запрос. Попробуйте позже.</p>
</body>
</html>
"#;

fn html(body: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub async fn about() -> HttpResponse {
    html(ABOUT_PAGE)
}

pub async fn rules() -> HttpResponse {
    html(RULES_PAGE)
}

/// Общая страница 404: и для несуществующих путей, и для сущностей,
/// отфильтрованных правилами видимости.
pub fn not_found_response() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(NOT_FOUND_PAGE)
}

pub fn server_error_response() -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type("text/html; charset=utf-8")
        .body(SERVER_ERROR_PAGE)
}

pub async fn not_found() -> HttpResponse {
    not_found_response()
}
