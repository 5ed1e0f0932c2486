//! All roles wired together in one process.

use std::sync::Arc;

use ap2_client::{CapabilityCache, RemoteAgentClient};
use ap2_core::credentials::{AccountStore, TokenStore};
use ap2_core::merchant::{Catalog, TrustedAgents};
use ap2_core::{Ap2Config, Ap2Result, DigestSigner, PresenceVerifier};
use chrono::Duration;

use crate::local::{LocalDirectory, LocalTransport};
use crate::roles::{
    CredentialsProviderExecutor, MerchantExecutor, PaymentProcessorExecutor,
    CREDENTIALS_PROVIDER_NAME, MERCHANT_NAME, PAYMENT_PROCESSOR_NAME,
};
use crate::service::AgentService;
use crate::shopping::ShoppingSession;

/// Merchant, payment processor and credentials provider behind in-process
/// transports, addressed by the URLs in the config.
pub struct LocalNetwork {
    config: Ap2Config,
    directory: LocalDirectory,
    cache: CapabilityCache,
}

impl LocalNetwork {
    pub fn start(config: Ap2Config, accounts: AccountStore, catalog: Catalog) -> Self {
        let cache = CapabilityCache::new();
        let verifier = Arc::new(PresenceVerifier);

        let credentials_provider = AgentService::new(Arc::new(CredentialsProviderExecutor::new(
            config.credentials_provider_url.clone(),
            TokenStore::new(accounts),
            verifier.clone(),
        )));

        let mut processor_directory = LocalDirectory::new();
        processor_directory.register(
            config.credentials_provider_url.clone(),
            credentials_provider.clone(),
        );

        let processor = AgentService::new(Arc::new(
            PaymentProcessorExecutor::new(
                config.payment_processor_url.clone(),
                config.challenge.clone(),
                verifier.clone(),
                Arc::new(processor_directory),
            )
            .with_required_extensions(config.required_extensions.clone()),
        ));

        let processor_client = RemoteAgentClient::new(
            PAYMENT_PROCESSOR_NAME,
            Arc::new(LocalTransport::new(
                config.payment_processor_url.clone(),
                processor.clone(),
            )),
            config.required_extensions.clone(),
        )
        .with_cache(cache.clone());

        let merchant = AgentService::new(Arc::new(
            MerchantExecutor::new(
                config.merchant_url.clone(),
                catalog,
                TrustedAgents::new(config.trusted_shopping_agents.clone()),
                verifier,
                processor_client,
            )
            .with_cart_ttl(Duration::minutes(config.cart_ttl_minutes)),
        ));

        let mut directory = LocalDirectory::new();
        directory.register(config.merchant_url.clone(), merchant);
        directory.register(config.payment_processor_url.clone(), processor);
        directory.register(config.credentials_provider_url.clone(), credentials_provider);

        Self {
            config,
            directory,
            cache,
        }
    }

    /// The demo accounts and catalog.
    pub fn demo(config: Ap2Config) -> Self {
        let mut catalog = Catalog::demo();
        catalog.merchant_name = config.merchant_name.clone();
        Self::start(config, AccountStore::demo(), catalog)
    }

    pub fn config(&self) -> &Ap2Config {
        &self.config
    }

    pub fn directory(&self) -> &LocalDirectory {
        &self.directory
    }

    pub fn client(&self, name: &str, url: &str) -> Ap2Result<RemoteAgentClient> {
        Ok(RemoteAgentClient::from_directory(
            &self.directory,
            name,
            url,
            self.config.required_extensions.clone(),
        )?
        .with_cache(self.cache.clone()))
    }

    /// A fresh shopping session talking to this network.
    pub fn shopping_session(&self) -> Ap2Result<ShoppingSession> {
        Ok(ShoppingSession::new(
            self.client(MERCHANT_NAME, &self.config.merchant_url)?,
            self.client(CREDENTIALS_PROVIDER_NAME, &self.config.credentials_provider_url)?,
            Arc::new(DigestSigner),
            self.config.shopping_agent_id.clone(),
        ))
    }
}
