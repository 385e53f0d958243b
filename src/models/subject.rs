use crate::error::ConfigError;
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// 科目枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// 物理
    Physics,
    /// 数学（专业级）
    MathProf,
    /// 俄语
    Russian,
}

/// 科目键 → 科目
static SUBJECTS: phf::Map<&'static str, Subject> = phf_map! {
    "physics" => Subject::Physics,
    "math_prof" => Subject::MathProf,
    "russian" => Subject::Russian,
};

impl Subject {
    /// 所有科目，按固定顺序
    pub const ALL: [Subject; 3] = [Subject::Physics, Subject::MathProf, Subject::Russian];

    /// 从科目键解析科目
    ///
    /// 未知键直接返回 [`ConfigError::UnknownSubject`]
    pub fn from_key(key: &str) -> Result<Self, ConfigError> {
        SUBJECTS
            .get(key.trim())
            .copied()
            .ok_or_else(|| ConfigError::UnknownSubject {
                key: key.to_string(),
                available: Self::ALL
                    .iter()
                    .map(|s| s.key())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// 科目键（也是数据目录名）
    pub fn key(self) -> &'static str {
        match self {
            Subject::Physics => "physics",
            Subject::MathProf => "math_prof",
            Subject::Russian => "russian",
        }
    }

    /// 题库系统中的项目 ID
    pub fn project_id(self) -> &'static str {
        match self {
            Subject::Physics => "BA1F39653304A5B041B656915DC36B38",
            Subject::MathProf => "AC437B34557F88EA4115D2F374B0A07B",
            Subject::Russian => "CA9D848CF10554A28617021C9211069B",
        }
    }

    /// 显示名称
    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Physics => "Физика",
            Subject::MathProf => "Математика (профильный уровень)",
            Subject::Russian => "Русский язык",
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_resolve() {
        assert_eq!(Subject::from_key("physics").unwrap(), Subject::Physics);
        assert_eq!(Subject::from_key(" math_prof ").unwrap(), Subject::MathProf);
        for subject in Subject::ALL {
            assert_eq!(Subject::from_key(subject.key()).unwrap(), subject);
        }
    }

    #[test]
    fn unknown_key_lists_available_subjects() {
        let err = Subject::from_key("chemistry").unwrap_err();
        match err {
            ConfigError::UnknownSubject { key, available } => {
                assert_eq!(key, "chemistry");
                assert_eq!(available, "physics, math_prof, russian");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn serializes_as_key() {
        let json = serde_json::to_string(&Subject::MathProf).unwrap();
        assert_eq!(json, "\"math_prof\"");
    }
}
