//! Offline answer source with canned replies
//!
//! Used when no API key is configured, so the pipeline can be exercised
//! end to end without the real system.

use super::traits::{measure_async, AnswerSource, Invocation};

const COOKING: &str = "料理の基本は、新鮮な食材を選び、適切な調理法を使うことです。初心者は簡単なレシピから始め、徐々に技術を磨いていくことをお勧めします。";
const INVESTING: &str = "投資を始める際は、まず緊急資金を確保し、リスク許容度を理解した上で、分散投資を心がけることが重要です。長期的な視点で投資し、定期的に見直しを行いましょう。";
const TRAVEL: &str = "旅行計画では、目的地の情報収集、予算設定、交通手段と宿泊先の予約が重要です。現地の文化や習慣を尊重し、柔軟なスケジュールを立てることで、より充実した旅行体験ができます。";
const HEALTH: &str = "健康維持には、バランスの良い食事、定期的な運動、十分な睡眠が重要です。自分の体力レベルに合った運動から始め、徐々に強度を上げていくことをお勧めします。";
const FALLBACK: &str = "申し訳ありませんが、その質問に対する具体的な情報を持っていません。もう少し詳しく教えていただけますか？";

/// Pick a canned answer by topic keyword
pub fn simulated_answer(question: &str) -> &'static str {
    if question.contains("料理") {
        COOKING
    } else if question.contains("投資") {
        INVESTING
    } else if question.contains("旅行") {
        TRAVEL
    } else if question.contains("健康") || question.contains("フィットネス") {
        HEALTH
    } else {
        FALLBACK
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAnswerSource;

#[async_trait::async_trait]
impl AnswerSource for SimulatedAnswerSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn invoke(&self, question: &str, _debug: bool) -> Invocation {
        let (answer, duration) = measure_async(async { simulated_answer(question) }).await;
        Invocation::success(answer, duration)
    }
}
