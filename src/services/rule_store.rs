// src/services/rule_store.rs

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::pricing::PricingRule;

/// Resultado da consulta de atribuição. "Sem fator" e "fator sem regras" são
/// estados diferentes e não podem ser confundidos.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignedRules {
    NotAssigned,
    Assigned(Vec<PricingRule>),
}

#[derive(Debug, Error)]
pub enum RuleLookupError {
    #[error("fonte de regras indisponível: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("regras malformadas: {0}")]
    Malformed(String),
}

/// De onde vêm as regras atribuídas a um usuário (o banco, em produção).
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Regras do fator ativo atribuído ao usuário, ordenadas por `min_price` crescente.
    async fn find_assigned_factor_rules(&self, user_id: i32) -> Result<AssignedRules, RuleLookupError>;
}

#[derive(Clone)]
pub struct RuleStore {
    source: Arc<dyn RuleSource>,
}

impl RuleStore {
    pub fn new(source: Arc<dyn RuleSource>) -> Self {
        Self { source }
    }

    /// `None` = usar a fórmula padrão (NÃO as regras do fator 1).
    /// `Some(vec![])` = fator atribuído, mas sem regras.
    ///
    /// Falha na consulta também devolve `None`: preferimos exibir a listagem com
    /// o preço padrão a derrubar a página. A falha fica registrada no log.
    pub async fn get_rules_for_user(&self, user_id: i32) -> Option<Vec<PricingRule>> {
        match self.source.find_assigned_factor_rules(user_id).await {
            Ok(AssignedRules::NotAssigned) => {
                tracing::debug!(user_id, "❌ Usuário sem fator atribuído, usando fórmula padrão");
                None
            }
            Ok(AssignedRules::Assigned(rules)) => {
                tracing::debug!(user_id, rules = rules.len(), "✅ Fator atribuído encontrado");
                Some(rules)
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "⚠️ Falha ao buscar regras do usuário, usando fórmula padrão");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::pricing::AdditionType;
    use std::collections::HashMap;

    /// Fonte em memória para testes (sem banco).
    #[derive(Default)]
    pub(crate) struct InMemoryRuleSource {
        pub assignments: HashMap<i32, Vec<PricingRule>>,
        pub failing_users: Vec<i32>,
    }

    #[async_trait]
    impl RuleSource for InMemoryRuleSource {
        async fn find_assigned_factor_rules(&self, user_id: i32) -> Result<AssignedRules, RuleLookupError> {
            if self.failing_users.contains(&user_id) {
                return Err(RuleLookupError::Malformed("addition_type desconhecido".into()));
            }
            Ok(match self.assignments.get(&user_id) {
                Some(rules) => AssignedRules::Assigned(rules.clone()),
                None => AssignedRules::NotAssigned,
            })
        }
    }

    pub(crate) fn sample_rule() -> PricingRule {
        PricingRule {
            min_price: 0.0,
            max_price: Some(500.0),
            addition_type: AdditionType::Fixed,
            addition_value: 100.0,
        }
    }

    fn store(source: InMemoryRuleSource) -> RuleStore {
        RuleStore::new(Arc::new(source))
    }

    #[tokio::test]
    async fn unassigned_user_gets_none() {
        let store = store(InMemoryRuleSource::default());
        assert_eq!(store.get_rules_for_user(7).await, None);
    }

    #[tokio::test]
    async fn assigned_user_gets_rules_in_order() {
        let second = PricingRule { min_price: 500.01, max_price: None, ..sample_rule() };
        let mut source = InMemoryRuleSource::default();
        source.assignments.insert(7, vec![sample_rule(), second.clone()]);

        let rules = store(source).get_rules_for_user(7).await.unwrap();
        assert_eq!(rules, vec![sample_rule(), second]);
    }

    #[tokio::test]
    async fn factor_without_rules_is_an_empty_list_not_none() {
        let mut source = InMemoryRuleSource::default();
        source.assignments.insert(7, Vec::new());

        assert_eq!(store(source).get_rules_for_user(7).await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn lookup_failure_falls_back_to_none() {
        let mut source = InMemoryRuleSource::default();
        source.assignments.insert(7, vec![sample_rule()]);
        source.failing_users.push(7);

        assert_eq!(store(source).get_rules_for_user(7).await, None);
    }

    #[tokio::test]
    async fn users_do_not_see_each_others_rules() {
        let mut source = InMemoryRuleSource::default();
        source.assignments.insert(1, vec![sample_rule()]);
        let store = store(source);

        let (a, b) = tokio::join!(store.get_rules_for_user(1), store.get_rules_for_user(2));
        assert_eq!(a, Some(vec![sample_rule()]));
        assert_eq!(b, None);
    }
}
