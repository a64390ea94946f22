use reqctx::redirect::InvalidRedirectCode;
use reqctx::test::TestContextBuilder;
use reqctx::{Context, RequestContext, StatusCode};

#[test]
fn invalid_codes_write_nothing() {
    for code in [200, 309] {
        let mut ctx = Context::new(TestContextBuilder::get("/").build());

        assert_eq!(
            ctx.redirect_html(code, "https://example.com"),
            Err(InvalidRedirectCode(code))
        );
        assert!(!ctx.response().is_committed());
        assert!(ctx.response().headers().is_empty());

        let response = ctx.into_inner().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
    }
}

#[test]
fn found_redirect_uses_header_meta_refresh_and_script() {
    let mut ctx = Context::new(TestContextBuilder::post("/login").build());

    ctx.redirect_html(302, "https://example.com").unwrap();

    let response = ctx.into_inner().into_response();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[http::header::LOCATION],
        "https://example.com"
    );
    assert_eq!(
        response.headers()[http::header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );

    let body = String::from_utf8(response.body().to_vec()).unwrap();
    assert!(body.contains("<meta http-equiv='Refresh' content='0; URL=https://example.com'>"));
    assert!(body.contains("<script>window.location.replace('https://example.com');</script>"));
}

#[test]
fn redirect_through_any_context() {
    fn redirect_home<C: RequestContext>(ctx: &mut Context<C>) -> reqctx::Result<()> {
        ctx.redirect_html(308, "/home")?;
        Ok(())
    }

    let mut ctx = Context::new(TestContextBuilder::get("/old-home").build());
    redirect_home(&mut ctx).unwrap();

    assert_eq!(ctx.response().status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(ctx.response().headers()[http::header::LOCATION], "/home");
}
