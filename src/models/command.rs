use serde::{Deserialize, Serialize};

/// 启动 / 停止指令
///
/// 由操作员界面发出，经指令中继送达引擎
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartStopCommand {
    pub running: bool,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
}

/// 控制台指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Start,
    Stop,
    Status,
    /// 为指定帖子生成回复并填入输入框（不发送）
    Draft(String),
    Quit,
}

impl OperatorCommand {
    /// 解析一行控制台输入；空行或未知指令返回 `None`
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let cmd = parts.next()?.to_ascii_lowercase();
        match cmd.as_str() {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "status" => Some(Self::Status),
            "draft" => parts.next().map(|id| Self::Draft(id.to_string())),
            "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operator_commands() {
        assert_eq!(OperatorCommand::parse("start"), Some(OperatorCommand::Start));
        assert_eq!(OperatorCommand::parse("  STOP "), Some(OperatorCommand::Stop));
        assert_eq!(
            OperatorCommand::parse("draft 1789"),
            Some(OperatorCommand::Draft("1789".into()))
        );
        assert_eq!(OperatorCommand::parse("draft"), None);
        assert_eq!(OperatorCommand::parse(""), None);
        assert_eq!(OperatorCommand::parse("dance"), None);
    }
}
