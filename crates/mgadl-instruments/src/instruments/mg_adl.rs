use mgadl_core::columns::item;

use crate::scoring::{Choice, Item};
use crate::Instrument;

/// MG-ADL: Myasthenia Gravis Activities of Daily Living profile.
/// 8 items, each scored 0–3. Total 0–24, higher = more impairment.
pub struct MgAdl;

impl Instrument for MgAdl {
    fn id(&self) -> &str {
        "mg_adl"
    }

    fn name(&self) -> &str {
        "MG-ADL"
    }

    fn items(&self) -> &[Item] {
        static ITEMS: std::sync::LazyLock<Vec<Item>> = std::sync::LazyLock::new(|| {
            let feeding_tube = "위장 영양관";
            let no_difficulty = "어려움 없음";
            let eye_frequency = [
                "없음",
                "발생하나 매일 발생하지는 않음",
                "매일 발생하나 지속적이지는 않음",
                "지속적임",
            ];

            vec![
                scored(
                    item::TALKING,
                    "말하기",
                    [
                        "정상",
                        "때때로 불분명하거나 콧소리 나는 발음",
                        "불분명하거나 콧소리가 나는 발음이 지속되나 이해할 수 있음",
                        "말을 이해하기 어려움",
                    ],
                ),
                scored(
                    item::CHEWING,
                    "씹기",
                    [
                        "정상",
                        "고형 음식을 씹기가 어려움",
                        "부드러운 음식을 씹기가 어려움",
                        feeding_tube,
                    ],
                ),
                scored(
                    item::SWALLOWING,
                    "삼키기",
                    [
                        "정상",
                        "드물게 사래 들리는 경우가 있음",
                        "자주 사래 들려 식사에 변화를 줄 필요가 있음",
                        feeding_tube,
                    ],
                ),
                scored(
                    item::BREATHING,
                    "숨쉬기",
                    [
                        "정상",
                        "힘든 활동 시 숨가쁨",
                        "휴식 시 숨가쁨",
                        "인공호흡기의존",
                    ],
                ),
                scored(
                    item::BRUSH_TEETH_HAIR,
                    "양치나 머리를 빗을 때",
                    [
                        no_difficulty,
                        "힘이 더 들지만 쉬는 기간이 필요하지 않음",
                        "쉬는 기간이 필요함",
                        "이 기능 중 한 가지를 할 수 없음",
                    ],
                ),
                scored(
                    item::ARISE_FROM_CHAIR,
                    "의자에서 일어설 때",
                    [
                        no_difficulty,
                        "경증으로, 가끔 팔을 사용함",
                        "중등도로, 항상 팔을 사용함",
                        "중증으로, 도움이 필요함",
                    ],
                ),
                scored(item::DIPLOPIA, "겹쳐보임(복시)", eye_frequency),
                scored(item::PTOSIS, "눈꺼풀처짐(안검하수)", eye_frequency),
            ]
        });
        &ITEMS
    }
}

fn scored(id: &str, question: &str, labels: [&str; 4]) -> Item {
    Item {
        id: id.to_string(),
        question: question.to_string(),
        choices: labels
            .iter()
            .zip(0u8..)
            .map(|(label, score)| Choice {
                score,
                label: label.to_string(),
            })
            .collect(),
    }
}
