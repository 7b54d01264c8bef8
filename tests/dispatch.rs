use std::cell::Cell;
use std::fs;

use monitoring_dispatcher::command::{
    AcknowledgeCommand, Command, Comment, DeleteCommentCommand, MonitoredObject, ScheduleDowntimeCommand, Target,
};
use monitoring_dispatcher::config::DispatcherConfig;
use monitoring_dispatcher::dispatch::{dispatch, notify, DispatchError, NotificationSink};
use monitoring_dispatcher::transport::{CommandTransport, LocalCommandFile, TransportChain, TransportError};
use tempfile::NamedTempFile;

/// 命令文件中的行, 去掉 `[timestamp] ` 前缀
fn commands_in(file: &NamedTempFile) -> Vec<String> {
    fs::read_to_string(file.path())
        .unwrap()
        .lines()
        .map(|line| {
            assert!(line.starts_with('['), "unframed line {}", line);
            line.split_once("] ").unwrap().1.to_string()
        })
        .collect()
}

#[test]
fn acknowledge_multiple_objects() {
    let file = NamedTempFile::new().unwrap();
    let transport = LocalCommandFile::new("local", file.path());
    let objects = [
        MonitoredObject::host("hostA"),
        MonitoredObject::host("hostB"),
        MonitoredObject::host("hostC"),
        MonitoredObject::service("hostC", "svc"),
    ];
    let comment = Comment::new("I can", "sends teh ack");

    let report = dispatch(&transport, &objects, |_| Ok(AcknowledgeCommand::new(comment.clone())));

    assert_eq!(report.succeeded, 4);
    assert_eq!(
        commands_in(&file),
        [
            "ACKNOWLEDGE_HOST_PROBLEM;hostA;0;0;0;I can;sends teh ack",
            "ACKNOWLEDGE_HOST_PROBLEM;hostB;0;0;0;I can;sends teh ack",
            "ACKNOWLEDGE_HOST_PROBLEM;hostC;0;0;0;I can;sends teh ack",
            "ACKNOWLEDGE_SVC_PROBLEM;hostC;svc;0;0;0;I can;sends teh ack",
        ]
    );
}

/// 第 `fail_on` 次调用时失败
#[derive(Debug)]
struct FailOnCall {
    fail_on: usize,
    calls: Cell<usize>,
    inner: LocalCommandFile,
}

impl CommandTransport for FailOnCall {
    fn name(&self) -> &str {
        "fail-on-call"
    }

    fn send(&self, command: &dyn Command, target: &Target, instance: Option<&str>) -> Result<(), TransportError> {
        self.calls.set(self.calls.get() + 1);
        if self.calls.get() == self.fail_on {
            return Err(TransportError::Remote {
                code: Some(255),
                output: "Connection closed".to_string(),
            });
        }
        self.inner.send(command, target, instance)
    }
}

#[derive(Default)]
struct Banner(std::cell::RefCell<Vec<String>>);

impl NotificationSink for Banner {
    fn success(&self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.0.borrow_mut().push(format!("error: {}", message));
    }
}

#[test]
fn second_object_failing_does_not_stop_the_batch() {
    let file = NamedTempFile::new().unwrap();
    let transport = FailOnCall {
        fail_on: 2,
        calls: Cell::new(0),
        inner: LocalCommandFile::new("local", file.path()),
    };
    let objects = [
        MonitoredObject::host("Testhost"),
        MonitoredObject::service("Testhost", "svc"),
        MonitoredObject::host("Otherhost"),
    ];
    let comment = Comment::new("me", "test");

    let report = dispatch(&transport, &objects, |_| ScheduleDowntimeCommand::new(comment.clone(), 25, 26));

    assert_eq!(transport.calls.get(), 3);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].object, MonitoredObject::service("Testhost", "svc"));
    assert!(matches!(
        report.failures[0].error,
        DispatchError::Send(TransportError::Remote { code: Some(255), .. })
    ));
    assert_eq!(
        commands_in(&file),
        [
            "SCHEDULE_HOST_DOWNTIME;Testhost;25;26;1;0;0;me;test",
            "SCHEDULE_HOST_DOWNTIME;Otherhost;25;26;1;0;0;me;test",
        ]
    );

    let banner = Banner::default();
    notify(&report, &banner, "downtime");
    assert_eq!(*banner.0.borrow(), ["Sent 3 downtimes"]);
}

#[test]
fn chain_routes_by_instance_and_falls_through() {
    let main = NamedTempFile::new().unwrap();
    let satellite = NamedTempFile::new().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let chain = TransportChain::new()
        .with(LocalCommandFile::new("broken", dir.path().join("missing.cmd")))
        .with(LocalCommandFile::new("main", main.path()).with_instance("main"))
        .with(LocalCommandFile::new("satellite", satellite.path()).with_instance("satellite"));

    let objects = [
        MonitoredObject::host("web1").with_instance("main"),
        MonitoredObject::host("web2").with_instance("Satellite"),
    ];
    let report = dispatch(&chain, &objects, |_| Ok(DeleteCommentCommand::new(42)));

    assert!(report.is_complete_success());
    assert_eq!(commands_in(&main), ["DEL_HOST_COMMENT;web1;42"]);
    assert_eq!(commands_in(&satellite), ["DEL_HOST_COMMENT;web2;42"]);
}

#[test]
fn transports_from_config() {
    let file = NamedTempFile::new().unwrap();
    let json = serde_json::json!({
        "transports": [{"name": "local", "path": file.path()}]
    });
    let config = DispatcherConfig::from_json_str(&json.to_string()).unwrap();
    let chain = config.build_transport().unwrap();

    let command = AcknowledgeCommand::new(Comment::new("Author", "Comment text").persistent(true))
        .sticky(true)
        .expire_at(1699999999)
        .unwrap();
    chain.send(&command, &Target::service("myhost", "myservice"), None).unwrap();

    assert_eq!(
        commands_in(&file),
        ["ACKNOWLEDGE_SVC_PROBLEM_EXPIRE;myhost;myservice;2;0;1;1699999999;Author;Comment text"]
    );
}
