use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use tracing::{debug, instrument, warn};

use super::{
    dto::PostForm,
    repo_types::BlogPost,
    services::{create_post, delete_post, edit_post, ensure_owner, CreateOutcome},
};
use crate::{
    auth::{
        extractors::{AuthUser, CurrentUser},
        repo_types::User,
    },
    error::AppError,
    extract::IdParam,
    redirect,
    state::AppState,
    validation::FormErrors,
    views,
};

pub fn posts_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/posts", get(list_posts))
        .route("/user/:id", get(user_posts).post(user_create_post))
        .route("/posts/delete/:id", get(delete))
        .route("/posts/edit/:id", get(edit_form).post(edit_submit))
}

#[instrument(skip_all)]
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
) -> Result<Html<String>, AppError> {
    let posts = BlogPost::list_all(&state.db).await?;
    Ok(Html(views::posts_page(current.as_ref(), &posts)))
}

async fn render_user_page(
    state: &AppState,
    current: Option<&User>,
    owner: &User,
    form: &PostForm,
    errors: &FormErrors,
) -> Result<Html<String>, AppError> {
    let posts = BlogPost::list_by_author(&state.db, owner.id).await?;
    Ok(Html(views::user_page(current, owner, &posts, form, errors)))
}

#[instrument(skip(state, current))]
pub async fn user_posts(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    IdParam(id): IdParam,
) -> Result<Html<String>, AppError> {
    let owner = User::get(&state.db, id).await?;
    render_user_page(&state, current.as_ref(), &owner, &PostForm::default(), &FormErrors::new()).await
}

/// Creates a post on behalf of user `id`. No session is required here.
#[instrument(skip(state, current, form))]
pub async fn user_create_post(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    IdParam(id): IdParam,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let owner = User::get(&state.db, id).await?;
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            warn!("post rejected");
            return Ok(render_user_page(&state, current.as_ref(), &owner, &form, &errors)
                .await?
                .into_response());
        }
    };

    // A duplicate title redirects exactly like a successful create.
    match create_post(&state.db, &owner, input).await? {
        CreateOutcome::Created(post) => debug!(post_id = post.id, "created"),
        CreateOutcome::DuplicateTitle => debug!("duplicate title ignored"),
    }
    Ok(redirect::to_user(owner.id))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    IdParam(id): IdParam,
) -> Result<Response, AppError> {
    let post = BlogPost::get(&state.db, id).await?;
    ensure_owner(&post, &user)?;
    delete_post(&state.db, &post).await?;
    Ok(redirect::to_posts())
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn edit_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    IdParam(id): IdParam,
) -> Result<Html<String>, AppError> {
    let post = BlogPost::get(&state.db, id).await?;
    ensure_owner(&post, &user)?;
    let form = PostForm {
        title: post.title.clone(),
        content: post.content.clone(),
    };
    Ok(Html(views::edit_page(Some(&user), &post, &form, &FormErrors::new())))
}

#[instrument(skip(state, user, form), fields(user_id = user.id))]
pub async fn edit_submit(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    IdParam(id): IdParam,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let post = BlogPost::get(&state.db, id).await?;
    ensure_owner(&post, &user)?;
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            warn!(post_id = post.id, "edit rejected");
            return Ok(Html(views::edit_page(Some(&user), &post, &form, &errors)).into_response());
        }
    };
    edit_post(&state.db, post, input).await?;
    Ok(redirect::to_posts())
}

#[cfg(test)]
mod tests {
    use axum::http::{header::LOCATION, StatusCode};

    use crate::{
        auth::repo_types::User,
        posts::repo_types::{utc_now, BlogPost},
        state::AppState,
        testing::{body_string, cookie_for, get, post_form},
    };

    const BODY: &str = "Thirty characters of content, at the very least.";

    async fn seed(state: &AppState) -> (User, User, BlogPost) {
        let alice = User::create(&state.db, "alice", "alice@x.com", "password1").await.unwrap();
        let bob = User::create(&state.db, "bobby", "bob@x.com", "password1").await.unwrap();
        let post = BlogPost::create(&state.db, "Bob's post", BODY, bob.id, utc_now())
            .await
            .unwrap();
        (alice, bob, post)
    }

    fn form_body(title: &str, content: &str) -> String {
        format!(
            "title={}&content={}",
            crate::redirect::encode_component(title),
            crate::redirect::encode_component(content)
        )
    }

    #[tokio::test]
    async fn listing_is_public_and_oldest_first() {
        let state = AppState::for_tests().await;
        let (alice, _, _) = seed(&state).await;
        BlogPost::create(&state.db, "Alice's post", BODY, alice.id, utc_now()).await.unwrap();

        for uri in ["/", "/posts"] {
            let res = get(&state, uri, None).await;
            assert_eq!(res.status(), StatusCode::OK);
            let html = body_string(res).await;
            let bob_at = html.find("Bob&#x27;s post").expect("bob's post listed");
            let alice_at = html.find("Alice&#x27;s post").expect("alice's post listed");
            assert!(bob_at < alice_at);
        }
    }

    #[tokio::test]
    async fn user_page_404s_for_unknown_or_malformed_ids() {
        let state = AppState::for_tests().await;
        assert_eq!(get(&state, "/user/99", None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(&state, "/user/abc", None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            post_form(&state, "/user/99", &form_body("t", BODY), None).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn signed_ids_are_not_ids() {
        let state = AppState::for_tests().await;
        let (alice, _, _) = seed(&state).await;
        assert_eq!(alice.id, 1);

        assert_eq!(get(&state, "/user/1", None).await.status(), StatusCode::OK);
        for uri in ["/user/+1", "/user/-1", "/user/1.0", "/user/%201"] {
            assert_eq!(get(&state, uri, None).await.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn create_from_user_page() {
        let state = AppState::for_tests().await;
        let (alice, _, _) = seed(&state).await;

        let uri = format!("/user/{}", alice.id);
        let res = get(&state, &uri, None).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = post_form(&state, &uri, &form_body("Fresh", BODY), None).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers().get(LOCATION).unwrap(), uri.as_str());

        let created = BlogPost::find_by_title(&state.db, "Fresh").await.unwrap().expect("row");
        assert_eq!(created.author_id, alice.id);
        assert!(body_string(get(&state, &uri, None).await).await.contains("Fresh"));
    }

    #[tokio::test]
    async fn duplicate_title_redirects_without_inserting() {
        let state = AppState::for_tests().await;
        let (alice, _, _) = seed(&state).await;

        let uri = format!("/user/{}", alice.id);
        let res = post_form(&state, &uri, &form_body("Bob's post", BODY), None).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers().get(LOCATION).unwrap(), uri.as_str());
        assert_eq!(BlogPost::list_all(&state.db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_post_rerenders_with_errors() {
        let state = AppState::for_tests().await;
        let (alice, _, _) = seed(&state).await;

        let res = post_form(&state, &format!("/user/{}", alice.id), &form_body("Short", "too short"), None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_string(res).await.contains("Field must be at least 30 characters long."));
        assert_eq!(BlogPost::list_all(&state.db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn anonymous_delete_redirects_to_login() {
        let state = AppState::for_tests().await;
        let res = get(&state, "/posts/delete/1", None).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers().get(LOCATION).unwrap(),
            "/login?next=%2Fposts%2Fdelete%2F1"
        );

        let res = get(&state, "/posts/edit/1", None).await;
        assert_eq!(
            res.headers().get(LOCATION).unwrap(),
            "/login?next=%2Fposts%2Fedit%2F1"
        );

        let res = get(&state, "/posts/edit/1?x=y", None).await;
        assert_eq!(
            res.headers().get(LOCATION).unwrap(),
            "/login?next=%2Fposts%2Fedit%2F1%3Fx%3Dy"
        );
    }

    #[tokio::test]
    async fn non_owner_cannot_delete_or_edit() {
        let state = AppState::for_tests().await;
        let (alice, _, post) = seed(&state).await;
        let cookie = cookie_for(&state, alice.id);

        let res = get(&state, &format!("/posts/delete/{}", post.id), Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = get(&state, &format!("/posts/edit/{}", post.id), Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = post_form(
            &state,
            &format!("/posts/edit/{}", post.id),
            &form_body("Hijacked", BODY),
            Some(&cookie),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        assert_eq!(BlogPost::get(&state.db, post.id).await.unwrap(), post);
        let listing = body_string(get(&state, "/posts", None).await).await;
        assert!(listing.contains("Bob&#x27;s post"));
    }

    #[tokio::test]
    async fn missing_post_is_404_for_logged_in_users() {
        let state = AppState::for_tests().await;
        let (alice, _, _) = seed(&state).await;
        let cookie = cookie_for(&state, alice.id);
        assert_eq!(get(&state, "/posts/delete/404", Some(&cookie)).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(&state, "/posts/edit/404", Some(&cookie)).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn owner_deletes_post() {
        let state = AppState::for_tests().await;
        let (_, bob, post) = seed(&state).await;
        let cookie = cookie_for(&state, bob.id);

        let res = get(&state, &format!("/posts/delete/{}", post.id), Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/posts");
        assert!(BlogPost::get(&state.db, post.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn edit_form_is_prefilled_with_stored_values() {
        let state = AppState::for_tests().await;
        let (_, bob, post) = seed(&state).await;
        let cookie = cookie_for(&state, bob.id);

        let res = get(&state, &format!("/posts/edit/{}", post.id), Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_string(res).await;
        assert!(html.contains(r#"value="Bob&#x27;s post""#));
        assert!(html.contains(BODY));
    }

    #[tokio::test]
    async fn owner_edits_post_and_unchanged_edit_is_a_no_op() {
        let state = AppState::for_tests().await;
        let (_, bob, post) = seed(&state).await;
        let cookie = cookie_for(&state, bob.id);
        let uri = format!("/posts/edit/{}", post.id);

        let res = post_form(&state, &uri, &form_body(&post.title, &post.content), Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/posts");
        assert_eq!(BlogPost::get(&state.db, post.id).await.unwrap(), post);

        let res = post_form(&state, &uri, &form_body("Renamed", BODY), Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        let reloaded = BlogPost::get(&state.db, post.id).await.unwrap();
        assert_eq!(reloaded.title, "Renamed");
        assert_eq!(reloaded.date_posted, post.date_posted);

        let res = post_form(&state, &uri, &form_body("", BODY), Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(BlogPost::get(&state.db, post.id).await.unwrap().title, "Renamed");
    }

    #[tokio::test]
    async fn session_for_deleted_user_is_anonymous() {
        let state = AppState::for_tests().await;
        let cookie = cookie_for(&state, 12345);
        let res = get(&state, "/posts/delete/1", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert!(res
            .headers()
            .get(LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("/login"));
    }
}
