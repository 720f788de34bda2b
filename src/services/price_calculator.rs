// src/services/price_calculator.rs
//
// Cálculo do preço exibido nas listagens. Puro e síncrono: recebe o preço bruto
// e as regras já resolvidas (uma vez por requisição) e devolve o preço final.

use crate::models::pricing::{AdditionType, PricingRule};

/// Até este valor (inclusive) a fórmula padrão soma um valor fixo.
pub const DEFAULT_FIXED_THRESHOLD: f64 = 500.0;
pub const DEFAULT_FIXED_ADDITION: f64 = 150.0;
/// Acima do limite, a fórmula padrão soma 35%.
pub const DEFAULT_PERCENTAGE_RATE: f64 = 0.35;

/// Ganchos de observabilidade do cálculo. Não alteram o resultado.
pub trait EvaluationObserver {
    fn rule_checked(&self, _price: f64, _index: usize, _rule: &PricingRule, _matched: bool) {}
    fn fallback_used(&self, _price: f64, _attempted_rules: usize) {}
    fn price_computed(&self, _raw: f64, _before_rounding: f64, _final_price: f64) {}
    fn price_rejected(&self, _raw: f64) {}
}

pub struct NoopObserver;

impl EvaluationObserver for NoopObserver {}

/// Emite cada passo como evento `tracing` (nível trace/debug).
pub struct TracingObserver;

impl EvaluationObserver for TracingObserver {
    fn rule_checked(&self, price: f64, index: usize, rule: &PricingRule, matched: bool) {
        tracing::trace!(
            price,
            rule = index + 1,
            min = rule.min_price,
            max = ?rule.max_price,
            addition_type = ?rule.addition_type,
            addition_value = rule.addition_value,
            matched,
            "📋 Regra avaliada"
        );
    }

    fn fallback_used(&self, price: f64, attempted_rules: usize) {
        tracing::trace!(price, attempted_rules, "🔄 Nenhuma regra casou, usando fórmula padrão");
    }

    fn price_computed(&self, raw: f64, before_rounding: f64, final_price: f64) {
        tracing::trace!(raw, before_rounding, final_price, "🎯 Preço calculado");
    }

    fn price_rejected(&self, raw: f64) {
        tracing::debug!(raw, "⚠️ Preço inválido, exibindo vazio");
    }
}

/// Uma regra casa quando `min <= preço` e (sem teto ou `preço <= max`).
/// Os dois limites são inclusivos.
pub fn rule_matches(rule: &PricingRule, price: f64) -> bool {
    let within_min = price >= rule.min_price;
    let within_max = rule.max_price.is_none_or(|max| price <= max);
    within_min && within_max
}

pub fn apply_addition(rule: &PricingRule, price: f64) -> f64 {
    match rule.addition_type {
        AdditionType::Fixed => price + rule.addition_value,
        // A ordem (preço * valor / 100) importa para bater com os valores de referência
        AdditionType::Percentage => price + (price * rule.addition_value / 100.0),
    }
}

/// Fórmula usada quando o usuário não tem fator ou nenhuma regra casou.
pub fn default_formula(price: f64) -> f64 {
    if price <= DEFAULT_FIXED_THRESHOLD {
        price + DEFAULT_FIXED_ADDITION
    } else {
        price + price * DEFAULT_PERCENTAGE_RATE
    }
}

/// Arredonda para o múltiplo de 50 "mais próximo" pela regra 25/75:
/// resto < 25 desce para a centena, resto < 75 vai para a centena + 50,
/// senão sobe para a próxima centena.
pub fn round_to_nearest_50_or_100(value: f64) -> f64 {
    let remainder = value % 100.0;
    if remainder < 25.0 {
        (value / 100.0).floor() * 100.0
    } else if remainder < 75.0 {
        (value / 100.0).floor() * 100.0 + 50.0
    } else {
        (value / 100.0).ceil() * 100.0
    }
}

/// Preço antes do arredondamento. A primeira regra que casa vence; as regras
/// são usadas na ordem recebida (quem chama já entrega ordenado por min_price).
pub fn marked_up_price<O: EvaluationObserver + ?Sized>(
    price: f64,
    rules: Option<&[PricingRule]>,
    observer: &O,
) -> f64 {
    let rules = rules.unwrap_or_default();

    for (index, rule) in rules.iter().enumerate() {
        let matched = rule_matches(rule, price);
        observer.rule_checked(price, index, rule, matched);
        if matched {
            return apply_addition(rule, price);
        }
    }

    observer.fallback_used(price, rules.len());
    default_formula(price)
}

/// Preço final exibido, ou `None` quando o preço bruto não é um número positivo
/// ou quando o acréscimo não cabe em um `f64`.
pub fn calculate_with<O: EvaluationObserver + ?Sized>(
    raw_price: f64,
    rules: Option<&[PricingRule]>,
    observer: &O,
) -> Option<f64> {
    if !raw_price.is_finite() || raw_price <= 0.0 {
        observer.price_rejected(raw_price);
        return None;
    }

    let before_rounding = marked_up_price(raw_price, rules, observer);
    // Acréscimo perto de f64::MAX estoura para infinito
    if !before_rounding.is_finite() {
        observer.price_rejected(raw_price);
        return None;
    }
    let final_price = round_to_nearest_50_or_100(before_rounding);
    observer.price_computed(raw_price, before_rounding, final_price);
    Some(final_price)
}

pub fn calculate(raw_price: f64, rules: Option<&[PricingRule]>) -> Option<f64> {
    calculate_with(raw_price, rules, &NoopObserver)
}

/// Pares de regras (índices) cujas faixas se sobrepõem. Sobreposição é permitida
/// (a primeira regra vence), mas quase sempre é engano de cadastro.
pub fn find_overlaps(rules: &[PricingRule]) -> Vec<(usize, usize)> {
    let mut overlaps = Vec::new();
    for (i, a) in rules.iter().enumerate() {
        for (j, b) in rules.iter().enumerate().skip(i + 1) {
            let a_max = a.max_price.unwrap_or(f64::INFINITY);
            let b_max = b.max_price.unwrap_or(f64::INFINITY);
            if a.min_price <= b_max && b.min_price <= a_max {
                overlaps.push((i, j));
            }
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn fixed(min: f64, max: Option<f64>, value: f64) -> PricingRule {
        PricingRule {
            min_price: min,
            max_price: max,
            addition_type: AdditionType::Fixed,
            addition_value: value,
        }
    }

    fn percentage(min: f64, max: Option<f64>, value: f64) -> PricingRule {
        PricingRule {
            min_price: min,
            max_price: max,
            addition_type: AdditionType::Percentage,
            addition_value: value,
        }
    }

    #[test]
    fn rounding_boundaries() {
        assert_eq!(round_to_nearest_50_or_100(124.0), 100.0);
        assert_eq!(round_to_nearest_50_or_100(125.0), 150.0);
        assert_eq!(round_to_nearest_50_or_100(174.0), 150.0);
        assert_eq!(round_to_nearest_50_or_100(175.0), 200.0);
        assert_eq!(round_to_nearest_50_or_100(1350.0), 1350.0);
        assert_eq!(round_to_nearest_50_or_100(810.0), 800.0);
    }

    #[test]
    fn rounding_always_lands_on_a_multiple_of_50_and_is_idempotent() {
        let mut value = 0.37;
        while value < 20_000.0 {
            let rounded = round_to_nearest_50_or_100(value);
            assert_eq!(rounded % 50.0, 0.0, "{} -> {}", value, rounded);
            assert_eq!(round_to_nearest_50_or_100(rounded), rounded);
            value += 13.37;
        }
    }

    #[test]
    fn default_formula_boundary() {
        assert_eq!(default_formula(500.0), 650.0);
        assert_eq!(default_formula(500.01), 500.01 + 500.01 * 0.35);
        assert_eq!(default_formula(250.0), 400.0);
    }

    #[test]
    fn no_rules_uses_default_formula() {
        // 250 + 150 = 400
        assert_eq!(calculate(250.0, None), Some(400.0));
        // 600 + 210 = 810 -> 800
        assert_eq!(calculate(600.0, None), Some(800.0));

        for price in [1.0, 99.0, 333.3, 500.0, 500.5, 749.99, 2_000.0, 12_345.0] {
            assert_eq!(
                calculate(price, None),
                Some(round_to_nearest_50_or_100(default_formula(price)))
            );
        }
    }

    #[test]
    fn matching_fixed_rule() {
        let rules = [fixed(0.0, Some(500.0), 100.0)];
        assert_eq!(calculate(250.0, Some(&rules)), Some(350.0));
    }

    #[test]
    fn unmatched_price_falls_back_to_default_formula() {
        let rules = [percentage(0.0, Some(999.0), 10.0)];
        // 1000 + 350 = 1350, resto 50 -> 1350
        assert_eq!(calculate(1000.0, Some(&rules)), Some(1350.0));
    }

    #[test]
    fn empty_rule_list_behaves_like_no_match() {
        assert_eq!(calculate(250.0, Some(&[])), calculate(250.0, None));
    }

    #[test]
    fn non_positive_or_non_finite_prices_are_absent() {
        assert_eq!(calculate(0.0, None), None);
        assert_eq!(calculate(-5.0, None), None);
        assert_eq!(calculate(f64::NAN, None), None);
        assert_eq!(calculate(f64::INFINITY, Some(&[fixed(0.0, None, 10.0)])), None);
    }

    #[test]
    fn markup_overflow_is_absent() {
        assert_eq!(calculate(1.5e308, None), None);
        assert_eq!(calculate(f64::MAX, Some(&[percentage(0.0, None, 50.0)])), None);
        assert_eq!(calculate(f64::MAX, Some(&[fixed(0.0, None, f64::MAX)])), None);

        let observer = RecordingObserver::default();
        assert_eq!(calculate_with(1.5e308, None, &observer), None);
        assert_eq!(*observer.fallbacks.borrow(), 1);
    }

    #[test]
    fn first_matching_rule_wins_on_overlap() {
        let rules = [fixed(0.0, Some(1000.0), 100.0), percentage(200.0, None, 50.0)];
        // Só a primeira regra é aplicada: 300 + 100 = 400
        assert_eq!(calculate(300.0, Some(&rules)), Some(400.0));

        let reversed = [percentage(200.0, None, 50.0), fixed(0.0, Some(1000.0), 100.0)];
        // 300 + 150 = 450
        assert_eq!(calculate(300.0, Some(&reversed)), Some(450.0));
    }

    #[test]
    fn rules_are_not_resorted() {
        let rules = [fixed(400.0, None, 500.0), fixed(0.0, None, 10.0)];
        assert_eq!(calculate(450.0, Some(&rules)), Some(950.0));
    }

    #[test]
    fn max_price_is_inclusive() {
        let rules = [fixed(0.0, Some(250.0), 100.0)];
        assert_eq!(calculate(250.0, Some(&rules)), Some(350.0));
        // 250.5 não casa: fórmula padrão (400.5 -> 400)
        assert_eq!(calculate(250.5, Some(&rules)), Some(400.0));
    }

    #[test]
    fn percentage_addition() {
        let rule = percentage(0.0, None, 20.0);
        assert_eq!(apply_addition(&rule, 1000.0), 1200.0);
        assert_eq!(calculate(1000.0, Some(&[rule])), Some(1200.0));
    }

    #[test]
    fn overlap_detection() {
        let clean = [
            fixed(0.0, Some(499.99), 150.0),
            percentage(500.0, Some(999.99), 30.0),
            percentage(1000.0, None, 25.0),
        ];
        assert!(find_overlaps(&clean).is_empty());

        let overlapping = [
            fixed(0.0, Some(500.0), 150.0),
            percentage(500.0, None, 35.0),
            fixed(100.0, Some(200.0), 10.0),
        ];
        assert_eq!(find_overlaps(&overlapping), vec![(0, 1), (0, 2)]);
    }

    #[derive(Default)]
    struct RecordingObserver {
        checked: RefCell<Vec<(usize, bool)>>,
        fallbacks: RefCell<usize>,
    }

    impl EvaluationObserver for RecordingObserver {
        fn rule_checked(&self, _price: f64, index: usize, _rule: &PricingRule, matched: bool) {
            self.checked.borrow_mut().push((index, matched));
        }

        fn fallback_used(&self, _price: f64, _attempted_rules: usize) {
            *self.fallbacks.borrow_mut() += 1;
        }
    }

    #[test]
    fn evaluation_stops_at_first_match() {
        let observer = RecordingObserver::default();
        let rules = [
            fixed(0.0, Some(100.0), 10.0),
            fixed(100.01, Some(500.0), 20.0),
            fixed(0.0, None, 30.0),
        ];

        let result = calculate_with(300.0, Some(&rules), &observer);

        assert_eq!(result, Some(300.0)); // 320 -> 300
        assert_eq!(*observer.checked.borrow(), vec![(0, false), (1, true)]);
        assert_eq!(*observer.fallbacks.borrow(), 0);
    }

    #[test]
    fn rejected_prices_never_reach_the_rules() {
        let observer = RecordingObserver::default();
        assert_eq!(calculate_with(-1.0, Some(&[fixed(0.0, None, 1.0)]), &observer), None);
        assert!(observer.checked.borrow().is_empty());
    }
}
