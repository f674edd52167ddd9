use actix_web::{get, web, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::{auth::AuthenticatedUser, graphql::Schema};

/// Executes a GraphQL request on behalf of the authenticated caller.
pub async fn graphql(
    schema: web::Data<Schema>,
    user: AuthenticatedUser,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let request = request.into_inner().data(user.context());
    schema.execute(request).await.into()
}

#[get("/graphiql")]
pub async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}
