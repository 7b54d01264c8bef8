//! 监控守护进程命令管道所期望的命令行格式

use monitoring_dispatcher::command::{
    AcknowledgeCommand, Command, Comment, DeleteAllCommentsCommand, DeleteCommentCommand, ScheduleDowntimeCommand,
    SubmitPassiveCheckResultCommand, Target,
};

fn myservice() -> Target {
    Target::service("myhost", "myservice")
}

#[test]
fn acknowledge_host_problem() {
    // persistent标志紧跟在notify之后
    let command = AcknowledgeCommand::new(Comment::new("Author", "Comment text")).notify(true);
    assert_eq!(
        command.render(&Target::host("myhost")).unwrap(),
        "ACKNOWLEDGE_HOST_PROBLEM;myhost;0;1;0;Author;Comment text"
    );
}

#[test]
fn acknowledge_service_problem_with_expiry() {
    let command = AcknowledgeCommand::new(Comment::new("Author", "Comment text").persistent(true))
        .sticky(true)
        .expire_at(1699999999)
        .unwrap();
    assert_eq!(
        command.render(&myservice()).unwrap(),
        "ACKNOWLEDGE_SVC_PROBLEM_EXPIRE;myhost;myservice;2;0;1;1699999999;Author;Comment text"
    );
}

#[test]
fn schedule_service_downtime() {
    let command = ScheduleDowntimeCommand::new(Comment::new("Author", "Comment"), 1699990000, 1699993600).unwrap();
    assert_eq!(
        command.render(&myservice()).unwrap(),
        "SCHEDULE_SVC_DOWNTIME;myhost;myservice;1699990000;1699993600;1;0;0;Author;Comment"
    );
}

#[test]
fn process_service_check_result() {
    let command = SubmitPassiveCheckResultCommand::new(0, "Output text").performance_data("perf=1");
    assert_eq!(
        command.render(&myservice()).unwrap(),
        "PROCESS_SERVICE_CHECK_RESULT;myhost;myservice;0;Output text|perf=1"
    );

    let without_perfdata = SubmitPassiveCheckResultCommand::new(0, "Output text");
    assert_eq!(
        without_perfdata.render(&myservice()).unwrap(),
        "PROCESS_SERVICE_CHECK_RESULT;myhost;myservice;0;Output text"
    );
}

#[test]
fn delete_comments() {
    assert_eq!(
        DeleteCommentCommand::new(42).render(&myservice()).unwrap(),
        "DEL_SVC_COMMENT;myhost;myservice;42"
    );
    assert_eq!(
        DeleteAllCommentsCommand::new().render(&myservice()).unwrap(),
        "DEL_ALL_SVC_COMMENTS;myhost;myservice"
    );
    assert_eq!(
        DeleteAllCommentsCommand::new().render(&Target::host("myhost")).unwrap(),
        "DEL_ALL_HOST_COMMENTS;myhost"
    );
    assert!(DeleteAllCommentsCommand::new()
        .render(&Target::Hostgroup("linux".into()))
        .is_err());
}
