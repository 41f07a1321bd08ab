use std::future::Future;

use async_graphql::{ObjectType, Request, Response, Schema, SubscriptionType};

/// The GraphQL engine a [`GraphQLServer`](super::GraphQLServer) drives.
pub trait Executor: Send + Sync + 'static {
    fn execute_request(&self, request: Request) -> impl Future<Output = Response> + Send;

    /// Schema definition language of everything the executor serves.
    fn sdl(&self) -> String;
}

impl<Query, Mutation, Subscription> Executor for Schema<Query, Mutation, Subscription>
where
    Query: ObjectType + 'static,
    Mutation: ObjectType + 'static,
    Subscription: SubscriptionType + 'static,
{
    async fn execute_request(&self, request: Request) -> Response {
        self.execute(request).await
    }

    fn sdl(&self) -> String {
        Schema::sdl(self)
    }
}
