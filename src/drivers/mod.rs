mod in_memory_test;
mod tokio_postgres;

pub use self::in_memory_test::{
    InMemoryTestConnection, InMemoryTestDriver, InMemoryTestResponseBuilder, RecordedQuery,
    TestResponse,
};
pub use self::tokio_postgres::{TokioPostgresConnection, TokioPostgresFactory};
