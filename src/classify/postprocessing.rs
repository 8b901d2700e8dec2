use crate::classify::types::{ClassProbabilities, PredictionResult};
use crate::models::{ClassLabel, NUM_CLASSES};
use crate::utils::error::ClassifierError;
use crate::Result;

/// 结果格式化器
pub struct ResultFormatter;

impl ResultFormatter {
    /// logits -> 预测结果
    pub fn format_logits(logits: &[f32]) -> Result<PredictionResult> {
        if logits.len() != NUM_CLASSES {
            return Err(ClassifierError::Inference(format!(
                "Expected {} logits, got {}",
                NUM_CLASSES,
                logits.len()
            )));
        }
        if logits.iter().any(|v| !v.is_finite()) {
            return Err(ClassifierError::Inference(
                "Model produced non-finite logits".to_string(),
            ));
        }

        let probabilities = softmax(logits);
        let best = argmax(&probabilities);

        let class = ClassLabel::from_index(best).ok_or_else(|| {
            ClassifierError::Inference(format!("Class index {} out of range", best))
        })?;

        let all_probabilities = ClassLabel::ALL
            .iter()
            .map(|label| (*label, to_percent(probabilities[label.index()])))
            .collect();

        Ok(PredictionResult {
            class,
            confidence: to_percent(probabilities[best]),
            all_probabilities: ClassProbabilities::new(all_probabilities),
        })
    }
}

/// 数值稳定的 softmax
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&v| (v as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// 最大值索引，相等时取第一个
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// 概率转百分比，保留两位小数
pub fn to_percent(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariants(result: &PredictionResult) {
        let max = result
            .all_probabilities
            .iter()
            .map(|(_, p)| p)
            .fold(f64::MIN, f64::max);

        assert_eq!(result.all_probabilities.len(), NUM_CLASSES);
        assert!((result.all_probabilities.total() - 100.0).abs() <= 0.1);
        assert!(result
            .all_probabilities
            .iter()
            .all(|(_, p)| (0.0..=100.0).contains(&p)));
        assert_eq!(result.confidence, max);
        assert_eq!(result.all_probabilities.get(result.class), Some(max));
    }

    #[test]
    fn softmax_sums_to_one_and_survives_large_logits() {
        let probs = softmax(&[1000.0, 999.0, -1000.0, 0.0, 3.5, 1000.0]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|p| p.is_finite() && *p >= 0.0));
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), 1);
        assert_eq!(argmax(&[0.9]), 0);
    }

    #[test]
    fn to_percent_rounds_to_two_decimals() {
        assert_eq!(to_percent(0.123456), 12.35);
        assert_eq!(to_percent(1.0), 100.0);
        assert_eq!(to_percent(0.0), 0.0);
    }

    #[test]
    fn picks_highest_logit() {
        let result =
            ResultFormatter::format_logits(&[0.1, 0.2, 4.0, 0.3, -1.0, 0.0]).unwrap();
        assert_eq!(result.class, ClassLabel::Healthy);
        assert_invariants(&result);
    }

    #[test]
    fn uniform_logits_select_first_label() {
        let result = ResultFormatter::format_logits(&[2.0; NUM_CLASSES]).unwrap();
        assert_eq!(result.class, ClassLabel::Dermatitis);
        assert_eq!(result.confidence, 16.67);
        assert_invariants(&result);
    }

    #[test]
    fn invariants_hold_across_logit_patterns() {
        let patterns: [[f32; NUM_CLASSES]; 4] = [
            [-3.2, 7.1, 0.0, 0.5, 2.2, -8.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 12.0],
            [1.5, 1.4, 1.3, 1.2, 1.1, 1.0],
            [-50.0, -49.0, -48.0, -47.0, -46.0, -45.0],
        ];

        for logits in patterns {
            let result = ResultFormatter::format_logits(&logits).unwrap();
            assert_invariants(&result);
        }
    }

    #[test]
    fn serializes_probabilities_in_label_order() {
        let result = ResultFormatter::format_logits(&[0.0, 0.0, 0.0, 0.0, 0.0, 5.0]).unwrap();
        let json = serde_json::to_string(&result).unwrap();

        assert!(json.starts_with("{\"class\":\"ringworm\""));
        let order: Vec<usize> = ClassLabel::ALL
            .iter()
            .map(|l| json.find(&format!("\"{}\":", l.as_str())).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rejects_wrong_logit_count() {
        let err = ResultFormatter::format_logits(&[0.0; 3]).unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
    }
}
