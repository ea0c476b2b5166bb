// ==========================================
// 编辑锁闸门集成测试
// ==========================================
// 覆盖: 全局开关 / 对象锁 / 方案锁对全部写操作的阻断,
//       被阻断时数据库状态完全不变, 读操作不受影响
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use work_schedule::api::ApiError;
use work_schedule::app::AppState;

/// 对方案内容执行全部写操作, 返回 (操作名, 结果)
fn attempt_all_mutations(env: &ApiTestEnv, s: &SeededPlan) -> Vec<(&'static str, Result<(), ApiError>)> {
    let h = &env.state.hierarchy_api;
    let plan = s.plan_id;
    let (c1, c2) = (s.chapters[0], s.chapters[1]);
    let (s1, s2) = (s.subchapters[0], s.subchapters[1]);
    let wt = s.work_types[0];
    let wp = s.work_plans[0];

    vec![
        ("add_chapter", h.add_chapter(plan, "New", 3).map(|_| ())),
        ("update_chapter", h.update_chapter(c1, plan, "Renamed", 1).map(|_| ())),
        ("delete_chapter", h.delete_chapter(c2, plan).map(|_| ())),
        ("reorder_chapters", h.reorder_chapters(plan, &[c2, c1]).map(|_| ())),
        ("add_subchapter", h.add_subchapter(c1, "New", 3).map(|_| ())),
        ("update_subchapter", h.update_subchapter(s1, c1, "Renamed", 1).map(|_| ())),
        ("delete_subchapter", h.delete_subchapter(s2, c1).map(|_| ())),
        ("reorder_subchapters", h.reorder_subchapters(c1, &[s2, s1]).map(|_| ())),
        ("move_subchapter", h.move_subchapter(s1, c2, plan).map(|_| ())),
        ("add_work_type", h.add_work_type(s1, "New", 2, "t", None).map(|_| ())),
        ("update_work_type", h.update_work_type(wt, plan, "Renamed", 1, "t").map(|_| ())),
        ("delete_work_type", h.delete_work_type(wt, plan).map(|_| ())),
        ("add_work_plan", h.add_work_plan(wt, date(2024, 2, 1), 3, None).map(|_| ())),
        ("update_work_plan", h.update_work_plan(wp, plan, date(2024, 2, 2), 4).map(|_| ())),
        ("delete_work_plan", h.delete_work_plan(wp, plan).map(|_| ())),
    ]
}

fn assert_all_blocked<F>(results: Vec<(&'static str, Result<(), ApiError>)>, expected: F)
where
    F: Fn(&ApiError) -> bool,
{
    for (name, result) in results {
        match result {
            Err(err) => assert!(expected(&err), "{}: 错误类型不符: {:?}", name, err),
            Ok(()) => panic!("{}: 期望被编辑锁拒绝", name),
        }
    }
}

#[test]
fn test_plan_lock_blocks_every_mutation_without_side_effects() {
    let env = ApiTestEnv::new().unwrap();
    let seeded = env.seed_plan();
    env.state.schedule_api.lock_plan(seeded.plan_id).unwrap();

    let before = env.snapshot();
    let results = attempt_all_mutations(&env, &seeded);
    assert_all_blocked(results, |e| matches!(e, ApiError::PlanLocked(_)));
    assert_eq!(env.snapshot(), before);
}

#[test]
fn test_object_lock_blocks_every_mutation_without_side_effects() {
    let env = ApiTestEnv::new().unwrap();
    let seeded = env.seed_plan();
    env.state.schedule_api.lock_object(seeded.object_id).unwrap();

    let before = env.snapshot();
    let results = attempt_all_mutations(&env, &seeded);
    assert_all_blocked(results, |e| matches!(e, ApiError::ObjectLocked(_)));
    assert_eq!(env.snapshot(), before);

    // 对象锁定时也不能创建新版本
    let result = env.state.schedule_api.create_work_schedule(seeded.object_id);
    assert!(matches!(result, Err(ApiError::ObjectLocked(_))));
}

#[test]
fn test_global_switch_blocks_every_mutation_without_side_effects() {
    let env = ApiTestEnv::new().unwrap();
    let seeded = env.seed_plan();
    env.state.schedule_api.lock_changes();

    let before = env.snapshot();
    let results = attempt_all_mutations(&env, &seeded);
    assert_all_blocked(results, |e| matches!(e, ApiError::ChangesLocked(_)));

    let api = &env.state.schedule_api;
    assert_lock_error(api.create_work_schedule(seeded.object_id));
    assert_lock_error(api.set_active_plan(seeded.plan_id));
    assert_lock_error(api.delete_work_schedule(seeded.plan_id));
    assert_lock_error(api.delete_object_schedules(seeded.object_id));

    assert_eq!(env.snapshot(), before);
}

#[test]
fn test_global_switch_is_reported_first() {
    let env = ApiTestEnv::new().unwrap();
    let seeded = env.seed_plan();
    env.state.schedule_api.lock_plan(seeded.plan_id).unwrap();
    env.state.schedule_api.lock_object(seeded.object_id).unwrap();
    env.state.schedule_api.lock_changes();

    let result = env.state.hierarchy_api.add_chapter(seeded.plan_id, "X", 9);
    assert!(matches!(result, Err(ApiError::ChangesLocked(_))));

    env.state.schedule_api.unlock_changes();
    let result = env.state.hierarchy_api.add_chapter(seeded.plan_id, "X", 9);
    assert!(matches!(result, Err(ApiError::ObjectLocked(_))));

    env.state.schedule_api.unlock_object(seeded.object_id).unwrap();
    let result = env.state.hierarchy_api.add_chapter(seeded.plan_id, "X", 9);
    assert!(matches!(result, Err(ApiError::PlanLocked(_))));
}

#[test]
fn test_unlock_restores_editing() {
    let env = ApiTestEnv::new().unwrap();
    let seeded = env.seed_plan();
    let api = &env.state.schedule_api;

    api.lock_plan(seeded.plan_id).unwrap();
    assert!(api.is_plan_locked(seeded.plan_id).unwrap().locked);
    api.unlock_plan(seeded.plan_id).unwrap();
    assert!(!api.is_plan_locked(seeded.plan_id).unwrap().locked);

    api.lock_object(seeded.object_id).unwrap();
    assert!(api.is_object_locked(seeded.object_id).unwrap().locked);
    api.unlock_object(seeded.object_id).unwrap();
    assert!(!api.is_object_locked(seeded.object_id).unwrap().locked);

    api.lock_changes();
    assert!(api.is_changes_locked().locked);
    api.unlock_changes();
    assert!(!api.is_changes_locked().locked);

    let added = env.state.hierarchy_api.add_chapter(seeded.plan_id, "After unlock", 3);
    assert!(added.is_ok());
}

#[test]
fn test_reads_are_never_gated() {
    let env = ApiTestEnv::new().unwrap();
    let seeded = env.seed_plan();
    env.state.schedule_api.lock_plan(seeded.plan_id).unwrap();
    env.state.schedule_api.lock_object(seeded.object_id).unwrap();
    env.state.schedule_api.lock_changes();

    let h = &env.state.hierarchy_api;
    assert_eq!(h.list_chapters(seeded.plan_id).unwrap().len(), 2);
    assert_eq!(h.list_subchapters(seeded.chapters[0]).unwrap().len(), 2);
    assert_eq!(h.list_work_types(seeded.subchapters[0]).unwrap().len(), 1);
    assert_eq!(h.list_work_plans(seeded.work_types[0]).unwrap().len(), 2);
    assert!(env.state.schedule_api.get_plan_structure(seeded.plan_id).is_ok());
    assert!(env
        .state
        .report_api
        .build_weekly_report(seeded.plan_id, date(2024, 1, 1), date(2024, 1, 31))
        .is_ok());
}

#[test]
fn test_locking_missing_targets_reports_not_found() {
    let env = ApiTestEnv::new().unwrap();
    let api = &env.state.schedule_api;

    assert_not_found(api.lock_plan(77));
    assert_not_found(api.unlock_plan(77));
    assert_not_found(api.is_plan_locked(77));
    assert_not_found(api.lock_object(77));
    assert_not_found(api.unlock_object(77));
    assert_not_found(api.is_object_locked(77));
}

#[test]
fn test_plan_lock_is_persisted_but_global_switch_is_not() {
    let env = ApiTestEnv::new().unwrap();
    let seeded = env.seed_plan();
    env.state.schedule_api.lock_plan(seeded.plan_id).unwrap();
    env.state.schedule_api.lock_changes();

    // 同一数据库上的新进程状态
    let restarted = AppState::new(env.db_path.clone()).unwrap();
    assert!(!restarted.schedule_api.is_changes_locked().locked);
    assert!(restarted.schedule_api.is_plan_locked(seeded.plan_id).unwrap().locked);
}

#[test]
fn test_locked_plan_does_not_block_other_plans() {
    let env = ApiTestEnv::new().unwrap();
    let locked = env.seed_plan();
    let open = env.seed_plan();
    env.state.schedule_api.lock_plan(locked.plan_id).unwrap();

    assert!(env.state.hierarchy_api.add_chapter(open.plan_id, "Free", 3).is_ok());
    assert_lock_error(env.state.hierarchy_api.add_chapter(locked.plan_id, "Blocked", 3));
}
