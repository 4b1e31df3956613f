use std::collections::HashMap;
use std::time::Duration;

use http::Method;
use serde_json::Value;

use strata_client::{ApiContext, Envelope, Transport};
use strata_schema::{
    EntitySchema, FieldDescriptor, default_fixed_fields, fallback_fields, json_column_for,
    normalize_fields,
};

use crate::cache::{CacheKey, CachedSchema, SchemaCache};
use crate::config::RegistryConfig;
use crate::error::RegistryError;

/// One entry of a multi-entity load: fetch `entity`'s schema and file the
/// result under `alias`.
#[derive(Debug, Clone)]
pub struct EntityRequest {
    pub alias: String,
    pub entity: String,
}

impl EntityRequest {
    pub fn new(alias: &str, entity: &str) -> Self {
        Self {
            alias: alias.to_string(),
            entity: entity.to_string(),
        }
    }
}

/// Fetches and caches field metadata. Owns the only mutable shared state in
/// the engine (the schema cache); consumers never touch the cache directly.
pub struct SchemaRegistry<T: Transport> {
    transport: T,
    ctx: ApiContext,
    cache: SchemaCache,
    schema_ttl: Duration,
    unified_ttl: Duration,
}

impl<T: Transport> SchemaRegistry<T> {
    pub fn new(transport: T, config: &RegistryConfig) -> Self {
        let mut ctx = ApiContext::new(&config.base_url, &config.tenant_id);
        if let Some(token) = &config.auth_token {
            ctx = ctx.with_token(token);
        }
        Self {
            transport,
            ctx,
            cache: SchemaCache::new(),
            schema_ttl: config.schema_ttl(),
            unified_ttl: config.unified_ttl(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        self.ctx.tenant_id()
    }

    /// Switch tenant context. All cached schemas belong to the old tenant and
    /// are dropped wholesale.
    pub fn set_tenant(&mut self, tenant_id: &str) {
        self.ctx.set_tenant(tenant_id);
        self.cache.invalidate_all();
        tracing::info!(tenant_id, "tenant switched, schema cache cleared");
    }

    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    fn fetch_data(&self, path: &str) -> Result<Value, RegistryError> {
        let req = self.ctx.request(Method::GET, path, &[], None)?;
        let res = self.transport.send(req)?;
        let envelope =
            Envelope::parse(res.body()).map_err(|e| RegistryError::Envelope(e.to_string()))?;
        envelope.into_data().map_err(RegistryError::Service)
    }

    /// Descriptor list for one entity's JSON column. Cache first; a miss
    /// fetches, normalizes, and stores before returning.
    pub fn dynamic_fields(
        &self,
        entity: &str,
        column: &str,
    ) -> Result<Vec<FieldDescriptor>, RegistryError> {
        let key = CacheKey::dynamic(self.tenant_id(), entity, column);
        if let Some(CachedSchema::Fields(fields)) = self.cache.get(&key, self.schema_ttl) {
            return Ok(fields);
        }

        let data = self.fetch_data(&format!("/json/schema/{entity}/{column}"))?;
        let fields: Vec<FieldDescriptor> = serde_json::from_value(data)?;
        let fields = normalize_fields(fields);
        tracing::debug!(entity, column, count = fields.len(), "dynamic schema fetched");

        self.cache.set(key, CachedSchema::Fields(fields.clone()));
        Ok(fields)
    }

    /// Like `dynamic_fields`, but substitutes the bundled fallback when the
    /// live fetch fails and a fallback exists for the pair. A successful
    /// fetch is never overridden.
    pub fn dynamic_fields_or_fallback(
        &self,
        entity: &str,
        column: &str,
    ) -> Result<Vec<FieldDescriptor>, RegistryError> {
        match self.dynamic_fields(entity, column) {
            Ok(fields) => Ok(fields),
            Err(e) => match fallback_fields(entity, column) {
                Some(fields) => {
                    tracing::warn!(entity, column, error = %e, "schema fetch failed, using bundled fallback");
                    Ok(fields)
                }
                None => Err(e),
            },
        }
    }

    /// Full fixed/dynamic split for one entity.
    pub fn entity_schema(&self, entity: &str) -> Result<EntitySchema, RegistryError> {
        self.entity_schema_with_ttl(entity, self.schema_ttl)
    }

    fn entity_schema_with_ttl(
        &self,
        entity: &str,
        ttl: Duration,
    ) -> Result<EntitySchema, RegistryError> {
        let key = CacheKey::entity(self.tenant_id(), entity);
        if let Some(CachedSchema::Entity(schema)) = self.cache.get(&key, ttl) {
            return Ok(schema);
        }

        let data = self.fetch_data(&format!("/schema/{entity}"))?;
        let schema: EntitySchema = serde_json::from_value(data)?;
        let schema = EntitySchema::new(
            normalize_fields(schema.fixed),
            normalize_fields(schema.dynamic),
        );
        tracing::debug!(
            entity,
            fixed = schema.fixed.len(),
            dynamic = schema.dynamic.len(),
            "entity schema fetched"
        );

        self.cache.set(key, CachedSchema::Entity(schema.clone()));
        Ok(schema)
    }

    /// Degraded-mode schema: the default fixed-field list plus the bundled
    /// dynamic fallback. Used when a load failure should not take down the
    /// whole form.
    pub fn entity_schema_or_default(&self, entity: &str) -> EntitySchema {
        match self.entity_schema(entity) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::warn!(entity, error = %e, "entity schema fetch failed, using defaults");
                EntitySchema::new(
                    default_fixed_fields(entity),
                    fallback_fields(entity, json_column_for(entity)).unwrap_or_default(),
                )
            }
        }
    }

    /// Load several entity schemas concurrently. Each alias captures its own
    /// success or failure; one failing entity never aborts the rest. Uses the
    /// shorter unified TTL.
    pub fn fetch_many(
        &self,
        requests: &[EntityRequest],
    ) -> HashMap<String, Result<EntitySchema, RegistryError>> {
        let (sender, receiver) = crossbeam::channel::bounded(requests.len());

        std::thread::scope(|scope| {
            for request in requests {
                let sender = sender.clone();
                scope.spawn(move || {
                    let result = self.entity_schema_with_ttl(&request.entity, self.unified_ttl);
                    let _ = sender.send((request.alias.clone(), result));
                });
            }
        });
        drop(sender);

        receiver.into_iter().collect()
    }
}
