use chrono::{DateTime, Utc};

/// 评论、确认、停机和自定义通知附带的作者与文本
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub author: String,
    pub content: String,
    /// 实例重启后保留评论
    pub persistent: bool,
    pub created: DateTime<Utc>,
}

impl Comment {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            persistent: false,
            created: Utc::now(),
        }
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// `[author, comment]`, 需要时在前面加上persistent标志
    pub fn arguments(&self, with_persistent: bool) -> Vec<String> {
        let mut args = Vec::with_capacity(3);
        if with_persistent {
            args.push(super::flag(self.persistent));
        }
        args.push(self.author.clone());
        args.push(self.content.clone());
        args
    }
}
