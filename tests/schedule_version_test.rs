// ==========================================
// 方案版本管理集成测试
// ==========================================
// 覆盖: 版本号递增、单一编辑中方案、激活/归档、当前方案查询
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use work_schedule::api::ApiError;
use work_schedule::config::config_keys;
use work_schedule::domain::PlanStatus;

#[test]
fn test_first_schedule_gets_version_one() {
    let env = ApiTestEnv::new().unwrap();
    let object_id = env.create_object("North", "Lenina 5");

    let created = env.state.schedule_api.create_work_schedule(object_id).unwrap();
    assert_eq!(created.data.version, 1);
    assert_eq!(created.data.status, PlanStatus::Editing);
    assert_eq!(created.data.object_id, object_id);

    let plan = env.state.schedule_api.get_plan(created.data.plan_id).unwrap();
    assert!(plan.is_editing());
}

#[test]
fn test_create_schedule_for_missing_object() {
    let env = ApiTestEnv::new().unwrap();
    assert_not_found(env.state.schedule_api.create_work_schedule(404));
}

#[test]
fn test_single_editing_plan_is_enforced() {
    let env = ApiTestEnv::new().unwrap();
    let object_id = env.create_object("North", "Lenina 5");
    env.create_plan(object_id);

    let result = env.state.schedule_api.create_work_schedule(object_id);
    assert!(matches!(result, Err(ApiError::ActivePlanExists(_))));
    assert_eq!(env.count_rows("work_schedule_plan"), 1);
}

#[test]
fn test_locking_current_plan_allows_next_version() {
    let env = ApiTestEnv::new().unwrap();
    let object_id = env.create_object("North", "Lenina 5");
    let v1 = env.create_plan(object_id);

    env.state.schedule_api.lock_plan(v1).unwrap();
    let v2 = env.state.schedule_api.create_work_schedule(object_id).unwrap();
    assert_eq!(v2.data.version, 2);

    let versions: Vec<i32> = env
        .state
        .schedule_api
        .list_plan_versions(object_id)
        .unwrap()
        .iter()
        .map(|p| p.version)
        .collect();
    assert_eq!(versions, vec![2, 1]);
}

#[test]
fn test_versions_are_monotonic_without_single_editing_rule() {
    let env = ApiTestEnv::new().unwrap();
    env.state
        .config_api
        .update_config(config_keys::SINGLE_EDITING_PLAN, "false")
        .unwrap();
    let object_id = env.create_object("North", "Lenina 5");

    let versions: Vec<i32> = (0..4)
        .map(|_| {
            env.state
                .schedule_api
                .create_work_schedule(object_id)
                .unwrap()
                .data
                .version
        })
        .collect();
    assert_eq!(versions, vec![1, 2, 3, 4]);
}

#[test]
fn test_versions_are_scoped_per_object() {
    let env = ApiTestEnv::new().unwrap();
    let a = env.create_object("North", "A");
    let b = env.create_object("South", "B");

    let pa = env.state.schedule_api.create_work_schedule(a).unwrap();
    let pb = env.state.schedule_api.create_work_schedule(b).unwrap();
    assert_eq!(pa.data.version, 1);
    assert_eq!(pb.data.version, 1);
    assert_ne!(pa.data.plan_id, pb.data.plan_id);
}

#[test]
fn test_set_active_plan_archives_siblings() {
    let env = ApiTestEnv::new().unwrap();
    let object_id = env.create_object("North", "Lenina 5");
    let v1 = env.create_plan(object_id);
    env.state.schedule_api.lock_plan(v1).unwrap();
    let v2 = env.create_plan(object_id);

    let activated = env.state.schedule_api.set_active_plan(v1).unwrap();
    assert_eq!(activated.data.status, PlanStatus::Editing);

    let v2_plan = env.state.schedule_api.get_plan(v2).unwrap();
    assert_eq!(v2_plan.status, PlanStatus::Archived);

    let current = env.state.schedule_api.get_current_schedule(object_id).unwrap();
    assert_eq!(current.plan.plan_id, v1);
}

#[test]
fn test_get_current_schedule_uses_status_not_latest_id() {
    let env = ApiTestEnv::new().unwrap();
    let object_id = env.create_object("North", "Lenina 5");
    let v1 = env.create_plan(object_id);
    env.state.schedule_api.lock_plan(v1).unwrap();

    // 无编辑中方案
    let result = env.state.schedule_api.get_current_schedule(object_id);
    assert_not_found(result);

    let v2 = env.create_plan(object_id);
    env.state.schedule_api.lock_plan(v2).unwrap();
    env.state.schedule_api.set_active_plan(v1).unwrap();

    let current = env.state.schedule_api.get_current_schedule(object_id).unwrap();
    assert_eq!(current.plan.plan_id, v1);
}

#[test]
fn test_unlock_plan_refuses_second_editing_plan() {
    let env = ApiTestEnv::new().unwrap();
    let object_id = env.create_object("North", "Lenina 5");
    let v1 = env.create_plan(object_id);
    env.state.schedule_api.lock_plan(v1).unwrap();
    env.create_plan(object_id);

    let result = env.state.schedule_api.unlock_plan(v1);
    assert!(matches!(result, Err(ApiError::ActivePlanExists(_))));
    assert!(env.state.schedule_api.is_plan_locked(v1).unwrap().locked);
}

#[test]
fn test_plan_structure_is_ordered() {
    let env = ApiTestEnv::new().unwrap();
    let object_id = env.create_object("North", "Lenina 5");
    let plan_id = env.create_plan(object_id);

    let late = env.add_chapter(plan_id, "Roof", 2);
    let early = env.add_chapter(plan_id, "Foundations", 1);
    let sub = env.add_subchapter(early.chapter_id, "Pit", 1);
    let wt = env.add_work_type(sub.subchapter_id, "Excavation", 1, "m3");
    env.add_work_plan(wt.work_type_id, date(2024, 3, 10), 5);
    env.add_work_plan(wt.work_type_id, date(2024, 3, 1), 7);

    let structure = env.state.schedule_api.get_plan_structure(plan_id).unwrap();
    let chapter_ids: Vec<i64> = structure.chapters.iter().map(|c| c.chapter_id).collect();
    assert_eq!(chapter_ids, vec![early.chapter_id, late.chapter_id]);

    let dates: Vec<_> = structure.work_plans.iter().map(|w| w.plan_date).collect();
    assert_eq!(dates, vec![date(2024, 3, 1), date(2024, 3, 10)]);
    assert_eq!(structure.object.unwrap().object_id, object_id);
}

#[test]
fn test_list_plans_newest_first() {
    let env = ApiTestEnv::new().unwrap();
    let a = env.create_object("North", "A");
    let b = env.create_object("South", "B");
    let pa = env.create_plan(a);
    let pb = env.create_plan(b);

    let plans = env.state.schedule_api.list_plans().unwrap();
    assert_eq!(plans.len(), 2);
    // 同一秒内创建时按 plan_id 降序
    assert_eq!(plans[0].plan_id, pb);
    assert_eq!(plans[1].plan_id, pa);
}
