use std::time::Instant;

use sqlx::{
    postgres::{PgArguments, PgRow},
    query::{Query, QueryAs},
    Executor, FromRow, Postgres,
};

use crate::error::{DalError, DalResult};

/// Attaches an operation name (and, optionally, latency reporting) to a
/// query before it is run, via a `.instrument("name").fetch_one(conn)`
/// style chain.
pub trait InstrumentExt: Sized {
    fn instrument(self, name: &'static str) -> Instrumented<Self>;
}

impl<'q> InstrumentExt for Query<'q, Postgres, PgArguments> {
    fn instrument(self, name: &'static str) -> Instrumented<Self> {
        Instrumented {
            inner: self,
            name,
            report_latency: false,
        }
    }
}

impl<'q, O> InstrumentExt for QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    fn instrument(self, name: &'static str) -> Instrumented<Self> {
        Instrumented {
            inner: self,
            name,
            report_latency: false,
        }
    }
}

pub struct Instrumented<Q> {
    inner: Q,
    name: &'static str,
    report_latency: bool,
}

impl<Q> Instrumented<Q> {
    pub fn report_latency(mut self) -> Self {
        self.report_latency = true;
        self
    }

    fn observe(name: &'static str, report_latency: bool, started: Instant) {
        let elapsed = started.elapsed();
        if report_latency {
            tracing::debug!(query = name, latency_ms = elapsed.as_millis(), "query finished");
        }
    }
}

impl<'q> Instrumented<Query<'q, Postgres, PgArguments>> {
    pub async fn execute<'e, E>(self, executor: E) -> DalResult<u64>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let started = Instant::now();
        let name = self.name;
        let result = self
            .inner
            .execute(executor)
            .await
            .map(|done| done.rows_affected())
            .map_err(|e| DalError::wrap(name, e));
        Self::observe(name, self.report_latency, started);
        result
    }

    pub async fn fetch_optional<'e, E>(self, executor: E) -> DalResult<Option<PgRow>>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let started = Instant::now();
        let name = self.name;
        let result = self
            .inner
            .fetch_optional(executor)
            .await
            .map_err(|e| DalError::wrap(name, e));
        Self::observe(name, self.report_latency, started);
        result
    }
}

impl<'q, O> Instrumented<QueryAs<'q, Postgres, O, PgArguments>>
where
    O: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub async fn fetch_one<'e, E>(self, executor: E) -> DalResult<O>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let started = Instant::now();
        let name = self.name;
        let result = self
            .inner
            .fetch_one(executor)
            .await
            .map_err(|e| DalError::wrap(name, e));
        Self::observe(name, self.report_latency, started);
        result
    }

    pub async fn fetch_optional<'e, E>(self, executor: E) -> DalResult<Option<O>>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let started = Instant::now();
        let name = self.name;
        let result = self
            .inner
            .fetch_optional(executor)
            .await
            .map_err(|e| DalError::wrap(name, e));
        Self::observe(name, self.report_latency, started);
        result
    }

    pub async fn fetch_all<'e, E>(self, executor: E) -> DalResult<Vec<O>>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let started = Instant::now();
        let name = self.name;
        let result = self
            .inner
            .fetch_all(executor)
            .await
            .map_err(|e| DalError::wrap(name, e));
        Self::observe(name, self.report_latency, started);
        result
    }
}
