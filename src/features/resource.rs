//! Generic clients for REST collections. A collection lives under one base
//! path such as `/users/`; items under `{base}{id}/`, and extra endpoints
//! under `{base}{name}/` or `{base}{id}/{name}/`.

use crate::{
    errors::ClientError,
    features::{envelope::ListEnvelope, rbac::types::ListQuery},
    transport::Transport,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

/// CRUD endpoints of one collection, e.g. `/users/`.
#[derive(Debug)]
pub struct Resource<T, P> {
    transport: Transport,
    base: &'static str,
    _record: PhantomData<fn() -> (T, P)>,
}

// Manual impl: the record and payload types need not be `Clone`.
impl<T, P> Clone for Resource<T, P> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            base: self.base,
            _record: PhantomData,
        }
    }
}

impl<T, P> Resource<T, P>
where
    T: DeserializeOwned,
    P: Serialize,
{
    #[must_use]
    pub fn new(transport: Transport, base: &'static str) -> Self {
        Self {
            transport,
            base,
            _record: PhantomData,
        }
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}{id}/", self.base)
    }

    fn collection_path(&self, name: &str) -> String {
        format!("{}{name}/", self.base)
    }

    fn item_action_path(&self, id: i64, name: &str) -> String {
        format!("{}{id}/{name}/", self.base)
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn list(&self, query: &ListQuery) -> Result<ListEnvelope<T>, ClientError> {
        self.transport.get_json_with_query(self.base, query).await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn get(&self, id: i64) -> Result<T, ClientError> {
        self.transport.get_json(&self.item_path(id)).await
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn create(&self, payload: &P) -> Result<T, ClientError> {
        self.transport.post_json(self.base, payload).await
    }

    /// Full update (`PUT`).
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn update(&self, id: i64, payload: &P) -> Result<T, ClientError> {
        self.transport.put_json(&self.item_path(id), payload).await
    }

    /// Partial update (`PATCH`); only the fields present in `changes` are
    /// touched.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn patch<B>(&self, id: i64, changes: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.transport.patch_json(&self.item_path(id), changes).await
    }

    /// # Errors
    /// Propagates transport failures.
    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.transport.delete(&self.item_path(id)).await
    }

    /// Aggregate counters; the shape differs per collection.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn stats(&self) -> Result<Value, ClientError> {
        self.view("stats").await
    }

    /// `GET {base}{name}/`, e.g. `/llm-models/available/`.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn view<R: DeserializeOwned>(&self, name: &str) -> Result<R, ClientError> {
        self.transport.get_json(&self.collection_path(name)).await
    }

    /// `GET {base}{id}/{name}/`, e.g. `/crewai-agents/3/tools/`.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn item_view<R: DeserializeOwned>(
        &self,
        id: i64,
        name: &str,
    ) -> Result<R, ClientError> {
        self.transport.get_json(&self.item_action_path(id, name)).await
    }

    /// Bodiless `POST {base}{name}/`.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn collection_action<R: DeserializeOwned>(
        &self,
        name: &str,
    ) -> Result<R, ClientError> {
        self.transport.post_empty(&self.collection_path(name)).await
    }

    /// `POST {base}{name}/` with a JSON body.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn collection_action_with<B, R>(&self, name: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.transport
            .post_json(&self.collection_path(name), body)
            .await
    }

    /// Bodiless `POST {base}{id}/{name}/`, e.g. `/crewai-agents/3/start/`.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn item_action<R: DeserializeOwned>(
        &self,
        id: i64,
        name: &str,
    ) -> Result<R, ClientError> {
        self.transport
            .post_empty(&self.item_action_path(id, name))
            .await
    }

    /// `POST {base}{id}/{name}/` with a JSON body.
    ///
    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn item_action_with<B, R>(
        &self,
        id: i64,
        name: &str,
        body: &B,
    ) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.transport
            .post_json(&self.item_action_path(id, name), body)
            .await
    }
}

/// Link records between two collections, e.g. `/user-roles/`.
#[derive(Debug)]
pub struct Assignments<T, A> {
    transport: Transport,
    base: &'static str,
    _record: PhantomData<fn() -> (T, A)>,
}

impl<T, A> Clone for Assignments<T, A> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            base: self.base,
            _record: PhantomData,
        }
    }
}

impl<T, A> Assignments<T, A>
where
    T: DeserializeOwned,
    A: Serialize,
{
    #[must_use]
    pub fn new(transport: Transport, base: &'static str) -> Self {
        Self {
            transport,
            base,
            _record: PhantomData,
        }
    }

    /// # Errors
    /// Propagates transport and decode failures.
    pub async fn list(&self, query: &ListQuery) -> Result<ListEnvelope<T>, ClientError> {
        self.transport.get_json_with_query(self.base, query).await
    }

    /// # Errors
    /// Propagates transport and decode failures; an existing link is a `400`.
    pub async fn assign(&self, assignment: &A) -> Result<T, ClientError> {
        self.transport.post_json(self.base, assignment).await
    }

    /// Removes the link record with `id`.
    ///
    /// # Errors
    /// Propagates transport failures.
    pub async fn remove(&self, id: i64) -> Result<(), ClientError> {
        self.transport.delete(&format!("{}{id}/", self.base)).await
    }
}
